//! Playable lifecycle state machine
//!
//! A playable is any unit with the start/pause/kill/reset/skip lifecycle:
//! tweens, delays, callbacks and sequences. This module holds the state
//! machine they all share ([`PlayableCore`]) and the object-safe trait
//! ([`Playable`]) through which tickers and sequences drive them.
//!
//! Completion is lazy: a playable stays `Finished` for exactly one extra
//! tick-cycle so listeners can read terminal values, then resets itself to
//! idle defaults on the next delivered tick (the `pending_cleanup` flag).

use serde::Serialize;

use crate::error::TweenError;
use crate::events::{emit, EventList, LifecycleCallback, UpdateCallback};

/// Lifecycle state shared by every playable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum State {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
    Killed,
}

/// Non-owning marker for whoever delivers ticks to a playable.
///
/// Ownership flows the other way: a sequence owns its step groups, a ticker
/// holds shared handles. The marker only answers "is someone going to tick
/// me?" at validation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parent {
    #[default]
    Detached,
    Ticker,
    Sequence,
}

/// Object-safe lifecycle surface of tweens, delays, callbacks and sequences.
pub trait Playable {
    fn state(&self) -> State;

    /// Accumulated time within the current loop iteration. May exceed
    /// `duration` once finished; the overshoot is the overflow a parent
    /// sequence carries into its next step.
    fn elapsed(&self) -> f32;

    /// Total time of one loop iteration.
    fn duration(&self) -> f32;

    fn set_parent(&mut self, parent: Parent);
    fn parent(&self) -> Parent;

    /// Multiplier applied to incoming deltas; takes effect on the next tick.
    fn set_timescale(&mut self, timescale: f32);

    /// Check start preconditions without mutating anything.
    fn validate(&self) -> Result<(), TweenError>;

    /// Transition `Idle -> Running`. Fails fast on configuration errors
    /// with no partial mutation; starting from any other state is a
    /// reported no-op.
    fn start(&mut self) -> Result<(), TweenError>;

    /// Consume one time delta. The delta is fully consumed across loop,
    /// yoyo and step boundaries within this single call.
    fn tick(&mut self, dt: f32);

    fn pause(&mut self);
    fn resume(&mut self);

    /// Terminal and idempotent: a killed playable never processes another
    /// tick, and killing it again is a no-op.
    fn kill(&mut self);

    /// Return to idle-equivalent internal values with loop counters
    /// restored. Registration with the parent is unchanged.
    fn reset(&mut self);

    /// Force `elapsed = duration` and run the natural completion path.
    /// Legal only from `Running` or `Paused`; anything else is a reported
    /// no-op.
    fn skip(&mut self);

    fn add_on_start(&mut self, callback: LifecycleCallback);
    fn add_on_update(&mut self, callback: UpdateCallback);
    fn add_on_killed(&mut self, callback: LifecycleCallback);
    fn add_on_complete(&mut self, callback: LifecycleCallback);
}

/// What a tick delivery is allowed to do, decided at tick entry.
pub(crate) enum TickGate {
    /// Run the tick body.
    Run,
    /// Deliver nothing (idle, paused or killed).
    Skip,
    /// The previous tick completed this playable; perform the lazy reset.
    Cleanup,
}

/// State machine shared by every playable through composition.
pub(crate) struct PlayableCore {
    pub(crate) state: State,
    pub(crate) elapsed: f32,
    pub(crate) duration: f32,
    pub(crate) timescale: f32,
    /// Remaining loop iterations; decremented at each boundary. `-1` keeps
    /// decrementing below zero and therefore never reaches the completion
    /// check, which is how infinite looping works.
    pub(crate) loop_remaining: i32,
    pub(crate) loop_total: i32,
    pub(crate) parent: Parent,
    pub(crate) pending_cleanup: bool,
    pub(crate) events: EventList,
}

impl PlayableCore {
    pub(crate) fn new(duration: f32) -> Self {
        Self {
            state: State::Idle,
            elapsed: 0.0,
            duration,
            timescale: 1.0,
            loop_remaining: 1,
            loop_total: 1,
            parent: Parent::Detached,
            pending_cleanup: false,
            events: EventList::default(),
        }
    }

    pub(crate) fn set_loops(&mut self, count: i32) {
        // 0 would decrement straight past the completion check.
        let count = if count == 0 { 1 } else { count };
        self.loop_total = count;
        self.loop_remaining = count;
    }

    /// Common start transition. Returns false (with a warning) when the
    /// playable is not startable.
    pub(crate) fn begin(&mut self) -> bool {
        if self.state != State::Idle {
            tracing::warn!(state = ?self.state, "cannot start a playable that is not idle");
            return false;
        }
        self.state = State::Running;
        emit(&mut self.events.start);
        true
    }

    pub(crate) fn pause(&mut self) {
        if self.state != State::Running {
            tracing::warn!(state = ?self.state, "cannot pause a playable that is not running");
            return;
        }
        self.state = State::Paused;
    }

    pub(crate) fn resume(&mut self) {
        if self.state != State::Paused {
            tracing::warn!(state = ?self.state, "cannot resume a playable that is not paused");
            return;
        }
        self.state = State::Running;
    }

    /// Kill transition. Returns false when already killed.
    pub(crate) fn kill(&mut self) -> bool {
        if self.state == State::Killed {
            return false;
        }
        self.state = State::Killed;
        emit(&mut self.events.killed);
        true
    }

    /// Natural completion: fire listeners and arm the lazy cleanup.
    /// `elapsed` keeps its overshoot so a parent can read the overflow.
    pub(crate) fn complete(&mut self) {
        self.state = State::Finished;
        self.pending_cleanup = true;
        emit(&mut self.events.complete);
    }

    pub(crate) fn reset(&mut self) {
        if self.state == State::Killed {
            return;
        }
        self.state = State::Idle;
        self.elapsed = 0.0;
        self.loop_remaining = self.loop_total;
        self.pending_cleanup = false;
    }

    pub(crate) fn tick_gate(&self) -> TickGate {
        if self.state == State::Killed {
            TickGate::Skip
        } else if self.pending_cleanup {
            TickGate::Cleanup
        } else if self.state == State::Running {
            TickGate::Run
        } else {
            TickGate::Skip
        }
    }

    /// Base skip: jump to the end. Legal only from `Running` or `Paused`;
    /// anything else returns false with a warning. The caller writes
    /// terminal values and completes when it returns true.
    pub(crate) fn skip_to_end(&mut self) -> bool {
        if !matches!(self.state, State::Running | State::Paused) {
            tracing::warn!(state = ?self.state, "cannot skip a playable that is not running or paused");
            return false;
        }
        self.elapsed = self.duration;
        true
    }
}

/// Accessor and event-registration boilerplate shared by every playable
/// that embeds a `core: PlayableCore` field.
macro_rules! impl_playable_accessors {
    () => {
        fn state(&self) -> $crate::playable::State {
            self.core.state
        }

        fn elapsed(&self) -> f32 {
            self.core.elapsed
        }

        fn duration(&self) -> f32 {
            self.core.duration
        }

        fn set_parent(&mut self, parent: $crate::playable::Parent) {
            self.core.parent = parent;
        }

        fn parent(&self) -> $crate::playable::Parent {
            self.core.parent
        }

        fn set_timescale(&mut self, timescale: f32) {
            self.core.timescale = timescale;
        }

        fn add_on_start(&mut self, callback: $crate::events::LifecycleCallback) {
            self.core.events.start.push(callback);
        }

        fn add_on_update(&mut self, callback: $crate::events::UpdateCallback) {
            self.core.events.update.push(callback);
        }

        fn add_on_killed(&mut self, callback: $crate::events::LifecycleCallback) {
            self.core.events.killed.push(callback);
        }

        fn add_on_complete(&mut self, callback: $crate::events::LifecycleCallback) {
            self.core.events.complete.push(callback);
        }
    };
}

pub(crate) use impl_playable_accessors;
