//! Event listener lists
//!
//! Every playable carries always-initialized ordered listener lists; an
//! empty list is the "no listeners" case. Insertion order is call order.
//! Listeners are registered between ticks; firing happens through
//! `&mut self`, so a callback cannot mutate the list it is firing from.

use smallvec::SmallVec;

use crate::playable::Playable;

/// Callback fired on a lifecycle boundary (start, complete, killed).
pub type LifecycleCallback = Box<dyn FnMut()>;

/// Callback fired once per consumed tick with `(dt, progress)`.
pub type UpdateCallback = Box<dyn FnMut(f32, f32)>;

/// Callback fired around a sequence step, with the step's first member.
pub type StepCallback = Box<dyn FnMut(&dyn Playable)>;

/// Per-tick listener registered on a tick source.
pub type TickCallback = Box<dyn FnMut(f32)>;

pub(crate) type Listeners<T> = SmallVec<[T; 2]>;

/// Listener lists common to every playable.
#[derive(Default)]
pub(crate) struct EventList {
    pub(crate) start: Listeners<LifecycleCallback>,
    pub(crate) update: Listeners<UpdateCallback>,
    pub(crate) killed: Listeners<LifecycleCallback>,
    pub(crate) complete: Listeners<LifecycleCallback>,
}

pub(crate) fn emit(list: &mut Listeners<LifecycleCallback>) {
    for callback in list.iter_mut() {
        callback();
    }
}

pub(crate) fn emit_update(list: &mut Listeners<UpdateCallback>, dt: f32, progress: f32) {
    for callback in list.iter_mut() {
        callback(dt, progress);
    }
}

pub(crate) fn emit_step(list: &mut Listeners<StepCallback>, playable: &dyn Playable) {
    for callback in list.iter_mut() {
        callback(playable);
    }
}
