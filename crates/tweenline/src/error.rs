use thiserror::Error;

/// Configuration errors raised synchronously from `start`, `validate` or
/// easing resolution.
///
/// None of these are retryable at runtime: the caller fixes the playable's
/// configuration and starts it again.
#[derive(Debug, Error)]
pub enum TweenError {
    /// A tracked property does not exist on the target at validation time.
    #[error("cannot tween unknown property `{0}`")]
    UnknownProperty(String),

    /// The playable has no parent ticker or sequence to deliver its ticks.
    #[error("cannot start a playable without a ticker")]
    MissingTicker,

    /// An easing identifier did not resolve to a curve.
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    /// Tweens and delays need a positive duration; zero is legal only for
    /// callbacks.
    #[error("duration must be positive")]
    ZeroDuration,
}
