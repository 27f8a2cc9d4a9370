//! Property tweens
//!
//! A [`Tween`] interpolates a set of named numeric properties on a shared
//! target from resolved start bounds to resolved end bounds, through an
//! easing curve, with optional yoyo bounces, step quantization and relative
//! end values.
//!
//! One tween owns its animation exclusively by convention only: two tweens
//! writing the same property on the same target overwrite each other in
//! tick order. That is caller responsibility, not something the engine
//! detects.

use indexmap::IndexMap;
use serde::Serialize;

use crate::easing::Easing;
use crate::error::TweenError;
use crate::events::emit_update;
use crate::playable::{impl_playable_accessors, Parent, Playable, PlayableCore, State, TickGate};
use crate::sequence::Sequence;
use crate::target::SharedTarget;

/// Animates named properties of a target object over one duration,
/// possibly across several loop iterations and yoyo bounces.
pub struct Tween {
    core: PlayableCore,
    target: SharedTarget,
    properties: Vec<String>,
    from: Option<IndexMap<String, f32>>,
    to: Option<IndexMap<String, f32>>,
    /// Resolved numeric bounds, parallel to `properties`. Recomputed at
    /// start and at every loop restart: relative mode and yoyo reversal
    /// change the effective bounds each iteration.
    current_from: Vec<f32>,
    current_to: Vec<f32>,
    relative: bool,
    /// Quantization bucket count; 0 disables quantization.
    steps: u32,
    yoyo_remaining: u32,
    yoyo_total: u32,
    easing: Easing,
}

impl Tween {
    /// Create a tween over `properties` of `target`. End values and the
    /// duration come from [`Tween::to`].
    pub fn new(
        target: SharedTarget,
        properties: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            core: PlayableCore::new(0.0),
            target,
            properties: properties.into_iter().map(Into::into).collect(),
            from: None,
            to: None,
            current_from: Vec::new(),
            current_to: Vec::new(),
            relative: false,
            steps: 0,
            yoyo_remaining: 0,
            yoyo_total: 0,
            easing: Easing::Linear,
        }
    }

    /// End values and the duration of one loop iteration. Properties absent
    /// from the map resolve to the target's current value (no movement).
    pub fn to<K: Into<String>>(
        mut self,
        to: impl IntoIterator<Item = (K, f32)>,
        duration: f32,
    ) -> Self {
        self.to = Some(to.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self.core.duration = duration;
        self
    }

    /// Explicit start values. Starting a tween with an explicit `from`
    /// teleports the target to those values.
    pub fn from<K: Into<String>>(mut self, from: impl IntoIterator<Item = (K, f32)>) -> Self {
        self.from = Some(from.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    /// Interpret end values as offsets from the target's value when the
    /// loop iteration starts.
    pub fn relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Resolve an easing by name; unknown names fail here rather than at
    /// start time.
    pub fn ease_named(self, name: &str) -> Result<Self, TweenError> {
        Ok(self.ease(Easing::from_name(name)?))
    }

    /// Quantize the eased value to `steps` buckets; 0 disables.
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Reverse-bounce `bounces` times at the end of each loop iteration.
    pub fn yoyo(mut self, bounces: u32) -> Self {
        self.yoyo_total = bounces;
        self.yoyo_remaining = bounces;
        self
    }

    /// Number of loop iterations; -1 loops forever.
    pub fn loops(mut self, count: i32) -> Self {
        self.core.set_loops(count);
        self
    }

    pub fn timescale(mut self, timescale: f32) -> Self {
        self.core.timescale = timescale;
        self
    }

    pub fn on_start(mut self, callback: impl FnMut() + 'static) -> Self {
        self.core.events.start.push(Box::new(callback));
        self
    }

    pub fn on_update(mut self, callback: impl FnMut(f32, f32) + 'static) -> Self {
        self.core.events.update.push(Box::new(callback));
        self
    }

    pub fn on_killed(mut self, callback: impl FnMut() + 'static) -> Self {
        self.core.events.killed.push(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.core.events.complete.push(Box::new(callback));
        self
    }

    /// Wrap this tween as the first step of a new sequence.
    pub fn into_sequence(self) -> Sequence {
        Sequence::new().append(self)
    }

    pub fn easing_name(&self) -> &'static str {
        self.easing.name()
    }

    /// Resolved `(from, to)` bounds, parallel to the tracked properties.
    /// Empty until the tween has started at least once.
    pub fn current_bounds(&self) -> (&[f32], &[f32]) {
        (&self.current_from, &self.current_to)
    }

    /// Live-mutate a running animation: add `diff` values to the target and
    /// to one side of the resolved bounds. Properties absent from `diff`
    /// are untouched; the loop iteration is not restarted.
    pub fn modify<K: AsRef<str>>(
        &mut self,
        diff: impl IntoIterator<Item = (K, f32)>,
        update_to_bound: bool,
    ) {
        for (prop, delta) in diff {
            let Some(index) = self
                .properties
                .iter()
                .position(|p| p.as_str() == prop.as_ref())
            else {
                continue;
            };
            {
                let mut target = self.target.borrow_mut();
                if let Some(value) = target.get(prop.as_ref()) {
                    target.set(prop.as_ref(), value + delta);
                }
            }
            let bounds = if update_to_bound {
                &mut self.current_to
            } else {
                &mut self.current_from
            };
            if let Some(bound) = bounds.get_mut(index) {
                *bound += delta;
            }
        }
    }

    /// Swap direction in place, mirroring `elapsed` around the duration so
    /// the animation continues from the same visual position backwards.
    /// A finished tween resets (keeping the reversed bounds) and restarts.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.current_from, &mut self.current_to);
        if self.current_from.len() == self.properties.len() && !self.properties.is_empty() {
            // Materialize both bound maps from the resolved values so any
            // later re-resolution lands exactly on the swapped endpoints.
            self.from = Some(self.bound_map(&self.current_from));
            self.to = Some(self.bound_map(&self.current_to));
            self.relative = false;
        } else {
            std::mem::swap(&mut self.from, &mut self.to);
        }
        let mirrored = self.core.duration - self.core.elapsed;
        self.core.elapsed = (mirrored * 1000.0).round() / 1000.0;

        if self.core.state == State::Finished {
            self.core.state = State::Idle;
            self.core.pending_cleanup = false;
            self.core.loop_remaining = self.core.loop_total;
            self.yoyo_remaining = self.yoyo_total;
            self.core.elapsed = 0.0;
            if let Err(err) = self.start() {
                tracing::warn!(%err, "could not restart reversed tween");
            }
        }
    }

    /// Serializable view of the live state.
    pub fn snapshot(&self) -> TweenSnapshot {
        TweenSnapshot {
            state: self.core.state,
            elapsed: self.core.elapsed,
            duration: self.core.duration,
            easing: self.easing.name(),
            properties: self.properties.clone(),
            from: self.current_from.clone(),
            to: self.current_to.clone(),
            loop_remaining: self.core.loop_remaining,
            yoyo_remaining: self.yoyo_remaining,
        }
    }

    fn bound_map(&self, values: &[f32]) -> IndexMap<String, f32> {
        self.properties
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect()
    }

    /// True while the current direction is a reverse bounce; the eased
    /// value runs mirrored and the bounds are swapped.
    fn on_reverse_bounce(&self) -> bool {
        (self.yoyo_total - self.yoyo_remaining) % 2 == 1
    }

    fn swap_bounds(&mut self) {
        std::mem::swap(&mut self.current_from, &mut self.current_to);
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// Resolve `current_from`/`current_to`, run at start and at every loop
    /// restart. An explicit `from` snaps the target to it immediately.
    fn check_position(&mut self) {
        self.current_from.resize(self.properties.len(), 0.0);
        self.current_to.resize(self.properties.len(), 0.0);

        let mut target = self.target.borrow_mut();
        for (index, prop) in self.properties.iter().enumerate() {
            let live = target.get(prop).unwrap_or(0.0);
            let from = self.from.as_ref().and_then(|map| map.get(prop).copied());
            self.current_from[index] = match from {
                Some(value) => {
                    target.set(prop, value);
                    value
                }
                None => live,
            };

            let base = target.get(prop).unwrap_or(0.0);
            let to = self.to.as_ref().and_then(|map| map.get(prop).copied());
            self.current_to[index] = match (to, self.relative) {
                (Some(value), true) => base + value,
                (Some(value), false) => value,
                (None, _) => base,
            };
        }
    }

    /// A fresh loop iteration re-arms yoyo and re-resolves bounds.
    fn restart_iteration(&mut self) {
        if self.on_reverse_bounce() {
            self.swap_bounds();
        }
        self.yoyo_remaining = self.yoyo_total;
        self.check_position();
        self.core.elapsed = 0.0;
    }

    fn eased_value(&self, progress: f32) -> f32 {
        let mut value = if self.on_reverse_bounce() {
            1.0 - self.easing.apply(1.0 - progress)
        } else {
            self.easing.apply(progress)
        };
        if self.steps != 0 {
            let steps = self.steps as f32;
            value = (value * steps).round() / steps;
        }
        value
    }

    fn write_properties(&self, value: f32) {
        let mut target = self.target.borrow_mut();
        for (index, prop) in self.properties.iter().enumerate() {
            let interpolated =
                self.current_from[index] + (self.current_to[index] - self.current_from[index]) * value;
            target.set(prop, interpolated);
        }
    }
}

impl Playable for Tween {
    impl_playable_accessors!();

    fn validate(&self) -> Result<(), TweenError> {
        let target = self.target.borrow();
        for prop in &self.properties {
            if target.get(prop).is_none() {
                return Err(TweenError::UnknownProperty(prop.clone()));
            }
        }
        if self.core.parent == Parent::Detached {
            return Err(TweenError::MissingTicker);
        }
        if self.core.duration <= 0.0 {
            return Err(TweenError::ZeroDuration);
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), TweenError> {
        if self.core.state != State::Idle {
            tracing::warn!(state = ?self.core.state, "cannot start a tween that is not idle");
            return Ok(());
        }
        self.validate()?;
        self.check_position();
        self.core.begin();
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        match self.core.tick_gate() {
            TickGate::Skip => return,
            TickGate::Cleanup => {
                self.reset();
                return;
            }
            TickGate::Run => {}
        }

        // The scaled delta is fully consumed across loop and yoyo
        // boundaries in this one call; a large dt can complete several
        // iterations, each carrying its leftover time forward.
        let mut remains = dt * self.core.timescale;
        while remains > 0.0 {
            self.core.elapsed += remains;
            let progress = (self.core.elapsed / self.core.duration).clamp(0.0, 1.0);
            let value = self.eased_value(progress);
            self.write_properties(value);
            emit_update(&mut self.core.events.update, remains, progress);

            if self.core.elapsed < self.core.duration {
                return;
            }
            remains = self.core.elapsed - self.core.duration;

            if self.yoyo_remaining > 0 {
                // Bounce: reverse direction and re-run the iteration with
                // the leftover time.
                self.swap_bounds();
                self.yoyo_remaining -= 1;
                self.core.elapsed = 0.0;
                continue;
            }

            self.core.loop_remaining -= 1;
            if self.core.loop_remaining == 0 {
                self.core.complete();
                return;
            }
            self.restart_iteration();
        }
    }

    fn pause(&mut self) {
        self.core.pause();
    }

    fn resume(&mut self) {
        self.core.resume();
    }

    fn kill(&mut self) {
        self.core.kill();
    }

    fn reset(&mut self) {
        if self.core.state == State::Killed {
            return;
        }
        if self.on_reverse_bounce() {
            self.swap_bounds();
        }
        self.yoyo_remaining = self.yoyo_total;
        self.core.reset();
    }

    fn skip(&mut self) {
        if !self.core.skip_to_end() {
            return;
        }
        // Terminal values are observable exactly as after a natural finish.
        if self.current_from.len() == self.properties.len() && !self.properties.is_empty() {
            let value = self.eased_value(1.0);
            self.write_properties(value);
            emit_update(&mut self.core.events.update, 0.0, 1.0);
        }
        self.core.complete();
    }
}

/// Serializable view of a tween's live state.
#[derive(Debug, Serialize)]
pub struct TweenSnapshot {
    pub state: State,
    pub elapsed: f32,
    pub duration: f32,
    pub easing: &'static str,
    pub properties: Vec<String>,
    pub from: Vec<f32>,
    pub to: Vec<f32>,
    pub loop_remaining: i32,
    pub yoyo_remaining: u32,
}
