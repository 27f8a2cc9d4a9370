//! # tweenline
//!
//! A deterministic value-interpolation engine. The host owns the clock:
//! it feeds frame deltas into a [`Ticker`], which distributes time to
//! attached playables. Tweens mutate named numeric properties of shared
//! targets through an easing curve; sequences chain tweens, delays and
//! callbacks into larger timelines.
//!
//! Everything is single-threaded and cooperative. No threads are spawned,
//! no clock is read; the same series of deltas always produces the same
//! series of values.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use tweenline::{Playable, PropertyBag, Ticker, Tween};
//!
//! let target = Rc::new(RefCell::new(PropertyBag::from([("x", 0.0)])));
//! let tween = Tween::new(target.clone(), ["x"])
//!     .to([("x", 10.0)], 1.0);
//!
//! let mut ticker = Ticker::new("main");
//! let handle = ticker.add(tween);
//! handle.borrow_mut().start().unwrap();
//!
//! ticker.tick(0.5);
//! assert_eq!(target.borrow().get("x"), Some(5.0));
//! ticker.tick(0.5);
//! assert_eq!(target.borrow().get("x"), Some(10.0));
//! ```

pub mod callback;
pub mod delay;
pub mod easing;
pub mod error;
pub mod events;
pub mod playable;
pub mod sequence;
pub mod target;
pub mod ticker;
pub mod tween;

pub use callback::Callback;
pub use delay::Delay;
pub use easing::Easing;
pub use error::TweenError;
pub use playable::{Parent, Playable, State};
pub use sequence::Sequence;
pub use target::{PropertyBag, SharedTarget, TweenTarget};
pub use ticker::{PlayableHandle, TickListenerId, TickSource, Ticker};
pub use tween::{Tween, TweenSnapshot};
