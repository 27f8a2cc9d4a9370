//! Sequence composition
//!
//! A [`Sequence`] orders playables into steps. Each step is a group of
//! playables that advance in parallel on the same delta; steps run one
//! after another. The sequence is itself a playable, and a tick source for
//! externally registered listeners.
//!
//! Leftover time from a completed step carries into the next step within
//! the same tick, mirroring the loop carry-forward of leaf playables, as
//! long as the carry is above float-noise level.

use crate::callback::Callback;
use crate::delay::Delay;
use crate::error::TweenError;
use crate::events::{emit_step, emit_update, Listeners, StepCallback, TickCallback};
use crate::playable::{impl_playable_accessors, Parent, Playable, PlayableCore, State, TickGate};
use crate::ticker::{TickListenerId, TickSource};

/// Leftover time at or below this threshold is treated as rounding noise
/// rather than a carry into the next step.
const STEP_CARRY_EPSILON: f32 = 0.01;

/// Composite playable: ordered steps of concurrently running children.
pub struct Sequence {
    core: PlayableCore,
    /// Owned step groups; children's parent back-reference points here.
    steps: Vec<Vec<Box<dyn Playable>>>,
    current_index: usize,
    step_active: bool,
    tick_listeners: Vec<(TickListenerId, TickCallback)>,
    next_listener_id: u64,
    on_step_start: Listeners<StepCallback>,
    on_step_end: Listeners<StepCallback>,
}

impl Sequence {
    pub fn new() -> Self {
        Self {
            core: PlayableCore::new(0.0),
            steps: Vec::new(),
            current_index: 0,
            step_active: false,
            tick_listeners: Vec::new(),
            next_listener_id: 0,
            on_step_start: Listeners::new(),
            on_step_end: Listeners::new(),
        }
    }

    /// Add a new step containing exactly this playable.
    pub fn append(mut self, playable: impl Playable + 'static) -> Self {
        self.steps.push(vec![Self::adopt(playable)]);
        self.recompute_duration();
        self
    }

    /// Add a new step firing a callback (zero duration).
    pub fn append_callback(self, callback: impl FnMut() + 'static) -> Self {
        self.append(Callback::new(callback))
    }

    /// Add a new step waiting out `duration`.
    pub fn append_interval(self, duration: f32) -> Self {
        self.append(Delay::new(duration))
    }

    /// Add a new first step containing exactly this playable.
    pub fn prepend(mut self, playable: impl Playable + 'static) -> Self {
        self.steps.insert(0, vec![Self::adopt(playable)]);
        self.recompute_duration();
        self
    }

    pub fn prepend_callback(self, callback: impl FnMut() + 'static) -> Self {
        self.prepend(Callback::new(callback))
    }

    pub fn prepend_interval(self, duration: f32) -> Self {
        self.prepend(Delay::new(duration))
    }

    /// Run this playable in parallel with the members of the last step, or
    /// like [`Sequence::append`] when no step exists yet.
    pub fn join(mut self, playable: impl Playable + 'static) -> Self {
        if self.steps.is_empty() {
            return self.append(playable);
        }
        if let Some(last) = self.steps.last_mut() {
            last.push(Self::adopt(playable));
        }
        self.recompute_duration();
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

    /// Fired when a step group activates, with the group's first member.
    pub fn on_step_start(mut self, callback: impl FnMut(&dyn Playable) + 'static) -> Self {
        self.on_step_start.push(Box::new(callback));
        self
    }

    /// Fired when every member of a step group has finished.
    pub fn on_step_end(mut self, callback: impl FnMut(&dyn Playable) + 'static) -> Self {
        self.on_step_end.push(Box::new(callback));
        self
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the active step group, if one is running.
    pub fn current_step_index(&self) -> Option<usize> {
        self.step_active.then_some(self.current_index)
    }

    /// Return the sequence to its default state: step list, active group
    /// and step index are dropped so an external allocator can pool it.
    pub fn clear(&mut self) {
        self.core = PlayableCore::new(0.0);
        self.steps.clear();
        self.current_index = 0;
        self.step_active = false;
        self.tick_listeners.clear();
        self.on_step_start.clear();
        self.on_step_end.clear();
    }

    /// One loop iteration lasts as long as every step's longest member,
    /// played back to back. Parents use this to read overflow as
    /// `elapsed - duration` like on any other playable.
    fn recompute_duration(&mut self) {
        self.core.duration = self
            .steps
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|child| child.duration())
                    .fold(0.0, f32::max)
            })
            .sum();
    }

    fn adopt(playable: impl Playable + 'static) -> Box<dyn Playable> {
        let mut boxed: Box<dyn Playable> = Box::new(playable);
        boxed.set_parent(Parent::Sequence);
        boxed
    }

    fn activate_next_step(&mut self) {
        if self.current_index >= self.steps.len() {
            return;
        }
        for child in self.steps[self.current_index].iter_mut() {
            if let Err(err) = child.start() {
                // Children are validated when the sequence starts; reaching
                // this means the configuration changed under us.
                tracing::warn!(%err, "sequence child failed to start");
            }
        }
        self.step_active = true;
        if let Some(first) = self.steps[self.current_index].first() {
            emit_step(&mut self.on_step_start, &**first);
        }
    }

    /// A fresh loop iteration: all children reset, step index back to
    /// zero. `carry` is the overflow consumed by this iteration already;
    /// `elapsed` starts there so parents keep reading time within the
    /// current iteration.
    fn restart_iteration(&mut self, carry: f32) {
        self.current_index = 0;
        self.step_active = false;
        self.core.elapsed = carry;
        for group in &mut self.steps {
            for child in group.iter_mut() {
                child.reset();
            }
        }
    }

    /// One pass of consumption. `carried` passes suppress the per-tick
    /// update event: it fires once per host tick, not once per nested
    /// consumption.
    fn advance(&mut self, dt: f32, carried: bool) {
        if !self.step_active {
            self.activate_next_step();
        }

        if self.step_active {
            // Externally registered listeners fire most-recently-added
            // first; that ordering is an observable contract.
            for (_, callback) in self.tick_listeners.iter_mut().rev() {
                callback(dt);
            }
            if let Some(group) = self.steps.get_mut(self.current_index) {
                for child in group.iter_mut() {
                    // A member that finished ahead of its siblings keeps
                    // its terminal state until the whole group completes;
                    // another tick would run its lazy cleanup early.
                    if !matches!(child.state(), State::Finished | State::Killed) {
                        child.tick(dt);
                    }
                }
            }
            if !carried {
                emit_update(&mut self.core.events.update, dt, 0.0);
            }
        }

        let mut remains = dt;
        if self.step_active {
            let group = &self.steps[self.current_index];
            if group.iter().any(|child| child.state() != State::Finished) {
                return;
            }
            if let Some(first) = self.steps[self.current_index].first() {
                remains = first.elapsed() - first.duration();
                emit_step(&mut self.on_step_end, &**first);
            }
            self.step_active = false;
            self.current_index += 1;
            if remains > STEP_CARRY_EPSILON {
                self.advance(remains, true);
                return;
            }
        }

        if !self.step_active && self.current_index >= self.steps.len() {
            self.core.loop_remaining -= 1;
            if self.core.loop_remaining == 0 {
                self.core.complete();
                return;
            }
            self.restart_iteration(remains);
            if remains > STEP_CARRY_EPSILON {
                self.advance(remains, true);
            }
        }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for Sequence {
    fn add_tick_listener(&mut self, callback: TickCallback) -> TickListenerId {
        let id = TickListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.tick_listeners.push((id, callback));
        id
    }

    fn remove_tick_listener(&mut self, id: TickListenerId) {
        self.tick_listeners.retain(|(listener, _)| *listener != id);
    }
}

impl Playable for Sequence {
    impl_playable_accessors!();

    fn validate(&self) -> Result<(), TweenError> {
        if self.core.parent == Parent::Detached {
            return Err(TweenError::MissingTicker);
        }
        for group in &self.steps {
            for child in group {
                child.validate()?;
            }
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), TweenError> {
        if self.core.state != State::Idle {
            tracing::warn!(state = ?self.core.state, "cannot start a sequence that is not idle");
            return Ok(());
        }
        // Fail fast before any child state changes.
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

        let local_dt = dt * self.core.timescale;
        self.core.elapsed += local_dt;
        self.advance(local_dt, false);
    }

    fn pause(&mut self) {
        self.core.pause();
    }

    fn resume(&mut self) {
        self.core.resume();
    }

    fn kill(&mut self) {
        if self.core.state == State::Killed {
            return;
        }
        for group in &mut self.steps {
            for child in group.iter_mut() {
                child.kill();
            }
        }
        self.core.kill();
    }

    fn reset(&mut self) {
        if self.core.state == State::Killed {
            return;
        }
        self.current_index = 0;
        self.step_active = false;
        for group in &mut self.steps {
            for child in group.iter_mut() {
                child.reset();
            }
        }
        self.core.reset();
    }

    fn skip(&mut self) {
        if !matches!(self.core.state, State::Running | State::Paused) {
            tracing::warn!(state = ?self.core.state, "cannot skip a sequence that is not running or paused");
            return;
        }
        for group_index in 0..self.steps.len() {
            for child_index in 0..self.steps[group_index].len() {
                if matches!(
                    self.steps[group_index][child_index].state(),
                    State::Finished | State::Killed
                ) {
                    continue;
                }
                // Steps the sequence never reached are driven through
                // their normal activation before being skipped.
                if self.steps[group_index][child_index].state() == State::Idle {
                    if let Err(err) = self.steps[group_index][child_index].start() {
                        tracing::warn!(%err, "sequence child failed to start");
                    }
                    emit_step(
                        &mut self.on_step_start,
                        &*self.steps[group_index][child_index],
                    );
                }
                self.steps[group_index][child_index].skip();
                emit_step(
                    &mut self.on_step_end,
                    &*self.steps[group_index][child_index],
                );
            }
        }
        self.step_active = false;
        self.current_index = self.steps.len();
        self.core.complete();
    }
}
