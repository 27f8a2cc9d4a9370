//! Tick distribution
//!
//! A [`Ticker`] is the engine root: the host hands it wall-clock deltas and
//! it fans them out to every attached playable. It owns no clock and spawns
//! no threads; whoever drives the frame loop drives the ticker.
//!
//! Attached playables are shared handles so the host can keep configuring a
//! tween after handing it over. Killed playables are pruned at the top of
//! each tick.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::TickCallback;
use crate::playable::{Parent, Playable, State};

/// Handle returned by [`TickSource::add_tick_listener`], used to detach the
/// listener later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickListenerId(pub(crate) u64);

/// Anything that can drive per-tick listeners.
pub trait TickSource {
    fn add_tick_listener(&mut self, callback: TickCallback) -> TickListenerId;
    fn remove_tick_listener(&mut self, id: TickListenerId);
}

/// Shared handle to an attached playable.
pub type PlayableHandle = Rc<RefCell<dyn Playable>>;

/// Root time distributor.
pub struct Ticker {
    name: String,
    state: State,
    timescale: f32,
    playables: Vec<PlayableHandle>,
    listeners: Vec<(TickListenerId, TickCallback)>,
    next_listener_id: u64,
}

impl Ticker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: State::Running,
            timescale: 1.0,
            playables: Vec::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn timescale(&self) -> f32 {
        self.timescale
    }

    pub fn set_timescale(&mut self, timescale: f32) {
        self.timescale = timescale;
    }

    pub fn pause(&mut self) {
        if self.state != State::Running {
            tracing::warn!(state = ?self.state, "cannot pause a ticker that is not running");
            return;
        }
        self.state = State::Paused;
    }

    pub fn resume(&mut self) {
        if self.state != State::Paused {
            tracing::warn!(state = ?self.state, "cannot resume a ticker that is not paused");
            return;
        }
        self.state = State::Running;
    }

    /// Attach a playable and return a shared handle to it, so the host can
    /// keep steering it after the ticker takes over delivery.
    pub fn add(&mut self, playable: impl Playable + 'static) -> PlayableHandle {
        let handle: PlayableHandle = Rc::new(RefCell::new(playable));
        self.add_handle(handle.clone());
        handle
    }

    /// Attach an already shared playable.
    pub fn add_handle(&mut self, handle: PlayableHandle) {
        handle.borrow_mut().set_parent(Parent::Ticker);
        self.playables.push(handle);
    }

    pub fn len(&self) -> usize {
        self.playables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playables.is_empty()
    }

    /// Deliver one frame delta to every listener and attached playable.
    pub fn tick(&mut self, dt: f32) {
        if self.state != State::Running {
            return;
        }
        let scaled = dt * self.timescale;

        self.playables
            .retain(|playable| playable.borrow().state() != State::Killed);

        for (_, callback) in self.listeners.iter_mut() {
            callback(scaled);
        }
        for playable in &self.playables {
            playable.borrow_mut().tick(scaled);
        }
    }
}

impl TickSource for Ticker {
    fn add_tick_listener(&mut self, callback: TickCallback) -> TickListenerId {
        let id = TickListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, callback));
        id
    }

    fn remove_tick_listener(&mut self, id: TickListenerId) {
        self.listeners.retain(|(listener, _)| *listener != id);
    }
}
