//! Fast, allocation-light multicast events for single-threaded code.
//!
//! A [`Relay`] decouples one event producer from many consumers: the
//! producer dispatches, every subscribed listener is invoked synchronously
//! on the calling stack. Subscribing and unsubscribing touch a compact
//! growable array rather than rebuilding a callback chain, so churn-heavy
//! code (UI, per-frame game logic) does not pay a per-operation allocation
//! tax, and dispatch itself allocates nothing at all.
//!
//! The building blocks:
//!
//! - [`Relay<A>`] - the event itself; owns the listener storage and the
//!   only dispatch operation.
//! - [`Listener<A>`] - an equality-comparable handle to a callback; keep a
//!   clone to unsubscribe later.
//! - [`RelayLink<A>`] - a facade over a relay with the subscription surface
//!   but no dispatch, for handing to non-owning code.
//! - [`RelayBinding`] - an enable/disable toggle pairing one listener with
//!   one relay.
//!
//! Listeners may be persistent (delivered every dispatch until removed) or
//! once (removed automatically after one delivery).
//!
//! # Mutating a relay from inside its own dispatch
//!
//! A listener can remove itself and can add new listeners during its own
//! invocation; additions are first delivered by the *next* dispatch. A
//! listener must not remove other listeners of the dispatching relay; see
//! [`Relay`] for the exact rules and what happens when they are broken.
//!
//! # Example
//!
//! ```rust
//! use relay::{Listener, Relay};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! // An event with two arguments: who scored, and how much.
//! let scored = Relay::<(String, u32)>::new();
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let log_clone = Rc::clone(&log);
//! let listener = Listener::new(move |(who, points): &(String, u32)| {
//!     log_clone.borrow_mut().push(format!("{who}: +{points}"));
//! });
//!
//! scored.add_listener(listener.clone(), false);
//! scored.dispatch(&("alice".to_string(), 10));
//!
//! scored.remove_listener(&listener);
//! scored.dispatch(&("bob".to_string(), 5));
//!
//! assert_eq!(log.borrow().as_slice(), ["alice: +10"]);
//! ```
//!
//! # Threading
//!
//! Everything in this crate is single-threaded (`!Send + !Sync`). Dispatch
//! is synchronous and never queues, defers or parallelizes; a listener that
//! needs to hand work to another thread does so itself.
//!
//! # Diagnostics
//!
//! The optional `tracker` feature adds an installable [`tracker`] that
//! records every persistent subscribe/unsubscribe for leak-hunting, without
//! changing relay behavior.

mod binding;
mod error;
mod link;
mod listener;
mod listener_set;
mod relay;
#[cfg(feature = "tracker")]
pub mod tracker;

pub use binding::RelayBinding;
pub use error::DispatchError;
pub use link::RelayLink;
pub use listener::Listener;
pub use relay::Relay;
