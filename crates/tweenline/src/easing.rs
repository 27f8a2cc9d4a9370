//! Easing curves for tweens
//!
//! Pure functions over normalized progress: `apply` maps `[0, 1]` to an
//! eased value with exact endpoints. Curves can be resolved by enum value,
//! by numeric id or by camelCase name, and report their name back for
//! introspection.

use std::f32::consts::PI;

use crate::error::TweenError;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InSine,
    OutSine,
    InOutSine,
    InCirc,
    OutCirc,
    InOutCirc,
    InQuint,
    OutQuint,
    InOutQuint,
    InExponential,
    OutExponential,
    InOutExponential,
    InElastic,
    OutElastic,
    InOutElastic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
}

const BACK_OVERSHOOT: f32 = 1.70158;

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => t * (2.0 - t),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::InQuart => t * t * t * t,
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::InSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::OutSine => (t * PI / 2.0).sin(),
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::InCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::OutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            Easing::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
            Easing::InQuint => t * t * t * t * t,
            Easing::OutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::InOutQuint => {
                if t < 0.5 {
                    16.0 * t * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Easing::InExponential => {
                if t <= 0.0 {
                    0.0
                } else {
                    (10.0 * t - 10.0).exp2()
                }
            }
            Easing::OutExponential => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - (-10.0 * t).exp2()
                }
            }
            Easing::InOutExponential => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    (20.0 * t - 10.0).exp2() / 2.0
                } else {
                    (2.0 - (-20.0 * t + 10.0).exp2()) / 2.0
                }
            }
            Easing::InElastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    -((10.0 * t - 10.0).exp2()) * ((t * 10.0 - 10.75) * c4).sin()
                }
            }
            Easing::OutElastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    (-10.0 * t).exp2() * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Easing::InOutElastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c5 = (2.0 * PI) / 4.5;
                    if t < 0.5 {
                        -((20.0 * t - 10.0).exp2() * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                    } else {
                        ((-20.0 * t + 10.0).exp2() * ((20.0 * t - 11.125) * c5).sin()) / 2.0 + 1.0
                    }
                }
            }
            Easing::InBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                c3 * t * t * t - BACK_OVERSHOOT * t * t
            }
            Easing::OutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_OVERSHOOT * (t - 1.0).powi(2)
            }
            Easing::InOutBack => {
                let c2 = BACK_OVERSHOOT * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
                }
            }
            Easing::InBounce => 1.0 - bounce_out(1.0 - t),
            Easing::OutBounce => bounce_out(t),
            Easing::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }

    /// Resolve an easing from its camelCase name, e.g. `"inOutQuad"`.
    pub fn from_name(name: &str) -> Result<Self, TweenError> {
        ALL.iter()
            .find(|easing| easing.name() == name)
            .copied()
            .ok_or_else(|| TweenError::UnknownEasing(name.to_owned()))
    }

    /// Resolve an easing from its numeric id (0..=30).
    pub fn from_id(id: u32) -> Result<Self, TweenError> {
        ALL.get(id as usize)
            .copied()
            .ok_or_else(|| TweenError::UnknownEasing(id.to_string()))
    }

    /// Name of this easing, usable with [`Easing::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::InQuad => "inQuad",
            Easing::OutQuad => "outQuad",
            Easing::InOutQuad => "inOutQuad",
            Easing::InCubic => "inCubic",
            Easing::OutCubic => "outCubic",
            Easing::InOutCubic => "inOutCubic",
            Easing::InQuart => "inQuart",
            Easing::OutQuart => "outQuart",
            Easing::InOutQuart => "inOutQuart",
            Easing::InSine => "inSine",
            Easing::OutSine => "outSine",
            Easing::InOutSine => "inOutSine",
            Easing::InCirc => "inCirc",
            Easing::OutCirc => "outCirc",
            Easing::InOutCirc => "inOutCirc",
            Easing::InQuint => "inQuint",
            Easing::OutQuint => "outQuint",
            Easing::InOutQuint => "inOutQuint",
            Easing::InExponential => "inExponential",
            Easing::OutExponential => "outExponential",
            Easing::InOutExponential => "inOutExponential",
            Easing::InElastic => "inElastic",
            Easing::OutElastic => "outElastic",
            Easing::InOutElastic => "inOutElastic",
            Easing::InBack => "inBack",
            Easing::OutBack => "outBack",
            Easing::InOutBack => "inOutBack",
            Easing::InBounce => "inBounce",
            Easing::OutBounce => "outBounce",
            Easing::InOutBounce => "inOutBounce",
        }
    }
}

/// Every easing, indexed by numeric id.
const ALL: [Easing; 31] = [
    Easing::Linear,
    Easing::InQuad,
    Easing::OutQuad,
    Easing::InOutQuad,
    Easing::InCubic,
    Easing::OutCubic,
    Easing::InOutCubic,
    Easing::InQuart,
    Easing::OutQuart,
    Easing::InOutQuart,
    Easing::InSine,
    Easing::OutSine,
    Easing::InOutSine,
    Easing::InCirc,
    Easing::OutCirc,
    Easing::InOutCirc,
    Easing::InQuint,
    Easing::OutQuint,
    Easing::InOutQuint,
    Easing::InExponential,
    Easing::OutExponential,
    Easing::InOutExponential,
    Easing::InElastic,
    Easing::OutElastic,
    Easing::InOutElastic,
    Easing::InBack,
    Easing::OutBack,
    Easing::InOutBack,
    Easing::InBounce,
    Easing::OutBounce,
    Easing::InOutBounce,
];

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}
