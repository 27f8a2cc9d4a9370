//! Pure time delays
//!
//! A [`Delay`] is a tween with no property mutation: it consumes time,
//! emits updates, loops and completes. Sequences use it for
//! `append_interval`-style gaps.

use crate::error::TweenError;
use crate::events::emit_update;
use crate::playable::{impl_playable_accessors, Parent, Playable, PlayableCore, State, TickGate};

/// Waits out a duration, carrying leftover time across loop boundaries like
/// any other playable.
pub struct Delay {
    core: PlayableCore,
}

impl Delay {
    pub fn new(duration: f32) -> Self {
        Self {
            core: PlayableCore::new(duration),
        }
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

    pub fn on_update(mut self, callback: impl FnMut(f32, f32) + 'static) -> Self {
        self.core.events.update.push(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.core.events.complete.push(Box::new(callback));
        self
    }
}

impl Playable for Delay {
    impl_playable_accessors!();

    fn validate(&self) -> Result<(), TweenError> {
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
            tracing::warn!(state = ?self.core.state, "cannot start a delay that is not idle");
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

        let mut remains = dt * self.core.timescale;
        while remains > 0.0 {
            self.core.elapsed += remains;
            let progress = (self.core.elapsed / self.core.duration).clamp(0.0, 1.0);
            emit_update(&mut self.core.events.update, remains, progress);

            if self.core.elapsed < self.core.duration {
                return;
            }
            remains = self.core.elapsed - self.core.duration;

            self.core.loop_remaining -= 1;
            if self.core.loop_remaining == 0 {
                self.core.complete();
                return;
            }
            self.core.elapsed = 0.0;
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
        self.core.reset();
    }

    fn skip(&mut self) {
        if !self.core.skip_to_end() {
            return;
        }
        emit_update(&mut self.core.events.update, 0.0, 1.0);
        self.core.complete();
    }
}
