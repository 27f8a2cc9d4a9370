//! Target property access
//!
//! Tweens never touch their target through reflection: they depend on the
//! [`TweenTarget`] capability, resolved once at validation time. Targets are
//! externally owned and shared with the engine as `Rc<RefCell<dyn
//! TweenTarget>>`; the whole engine is single-threaded and cooperative, so
//! a `tick` call always returns before anyone else needs the borrow.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

/// An object whose numeric properties a tween can animate.
///
/// `get` returning `None` means the property does not exist; validation
/// rejects tweens tracking such a property before anything is mutated.
pub trait TweenTarget {
    fn get(&self, prop: &str) -> Option<f32>;
    fn set(&mut self, prop: &str, value: f32);
}

/// Shared handle to a tween target.
pub type SharedTarget = Rc<RefCell<dyn TweenTarget>>;

/// Insertion-ordered key-value property set.
///
/// The plain dynamic target for tests and ad-hoc animation; domain types
/// implement [`TweenTarget`] directly instead.
#[derive(Clone, Debug, Default)]
pub struct PropertyBag {
    values: IndexMap<String, f32>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prop: &str) -> Option<f32> {
        self.values.get(prop).copied()
    }

    pub fn set(&mut self, prop: impl Into<String>, value: f32) {
        self.values.insert(prop.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TweenTarget for PropertyBag {
    fn get(&self, prop: &str) -> Option<f32> {
        self.values.get(prop).copied()
    }

    fn set(&mut self, prop: &str, value: f32) {
        self.values.insert(prop.to_owned(), value);
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f32); N]> for PropertyBag {
    fn from(entries: [(K, f32); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
