//! Instant callbacks
//!
//! A [`Callback`] is the one playable with a legal zero duration: it fires
//! its closure on the first delivered tick (even a zero-dt one) and
//! completes immediately. Its `elapsed` keeps the whole incoming delta so a
//! parent sequence carries all of it into the next step.

use crate::error::TweenError;
use crate::events::emit_update;
use crate::playable::{impl_playable_accessors, Parent, Playable, PlayableCore, State, TickGate};

/// Zero-duration playable wrapping a closure.
pub struct Callback {
    core: PlayableCore,
    callback: Box<dyn FnMut()>,
}

impl Callback {
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        Self {
            core: PlayableCore::new(0.0),
            callback: Box::new(callback),
        }
    }

    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.core.events.complete.push(Box::new(callback));
        self
    }
}

impl Playable for Callback {
    impl_playable_accessors!();

    fn validate(&self) -> Result<(), TweenError> {
        if self.core.parent == Parent::Detached {
            return Err(TweenError::MissingTicker);
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), TweenError> {
        if self.core.state != State::Idle {
            tracing::warn!(state = ?self.core.state, "cannot start a callback that is not idle");
            return Ok(());
        }
        self.validate()?;
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

        let scaled = dt * self.core.timescale;
        self.core.elapsed += scaled;
        (self.callback)();
        emit_update(&mut self.core.events.update, scaled, 1.0);
        self.core.complete();
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
        self.core.reset();
    }

    fn skip(&mut self) {
        if !self.core.skip_to_end() {
            return;
        }
        self.core.complete();
    }
}
