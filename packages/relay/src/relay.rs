use std::cell::{Cell, RefCell};
use std::fmt;
use std::ptr;

use scopeguard::defer;

use crate::listener_set::ListenerSet;
#[cfg(feature = "tracker")]
use crate::tracker::{self, RelayId};
use crate::{DispatchError, Listener, RelayBinding, RelayLink};

/// A multicast event: one producer dispatches, many listeners receive.
///
/// The relay owns two listener sets: persistent listeners, which stay
/// subscribed until explicitly removed, and once listeners, which are removed
/// automatically after one delivery. Dispatch runs every applicable listener
/// synchronously on the calling stack, so the producer keeps exclusive control
/// of when and where listener code runs.
///
/// `A` is the argument type delivered to listeners: `()` for no arguments,
/// a bare type for one argument, a tuple for up to four. Listeners receive
/// the arguments by reference, so no `Clone` bound is ever needed.
///
/// Whoever owns the relay can dispatch. Code that should only be able to
/// subscribe gets the [`link()`][Self::link] facade instead, which exposes
/// the whole subscription surface but has no dispatch operation.
///
/// # Mutation during dispatch
///
/// A listener may, during its own invocation on this relay:
///
/// * remove *itself* - delivery to every other listener is unaffected;
/// * add new listeners - they are not visited until the next dispatch.
///
/// A listener must not remove *other* listeners of this relay, or call
/// [`remove_all()`][Self::remove_all] on it, mid-dispatch. Doing so
/// invalidates the snapshot the pass iterates over; when detected this
/// aborts the pass with [`DispatchError::SnapshotInvalidated`].
///
/// These guarantees fall out of reverse iteration: the pass walks from the
/// snapshot length down to index zero, so a self-removal only shifts
/// already-visited entries and an addition appends above the snapshot where
/// the pass never reaches.
///
/// # Threading
///
/// Single-threaded by design. The relay is `!Send + !Sync`; share it within
/// a thread via `Rc` or plain borrows.
///
/// # Example
///
/// ```rust
/// use relay::{Listener, Relay};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let relay = Relay::<u32>::new();
///
/// let total = Rc::new(Cell::new(0));
/// let total_clone = Rc::clone(&total);
/// relay.add_listener(
///     Listener::new(move |value| total_clone.set(total_clone.get() + value)),
///     false,
/// );
///
/// relay.dispatch(&2);
/// relay.dispatch(&40);
///
/// assert_eq!(total.get(), 42);
/// ```
pub struct Relay<A: 'static> {
    persistent: RefCell<ListenerSet<A>>,
    once: RefCell<ListenerSet<A>>,

    /// Set for the duration of a dispatch pass. The reverse-snapshot walk
    /// does not compose with itself over shared storage, so a nested
    /// dispatch on the same instance is rejected instead.
    dispatching: Cell<bool>,
}

impl<A> Relay<A> {
    /// Creates a relay with no listeners.
    ///
    /// No storage is allocated until the first listener is added.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            persistent: RefCell::new(ListenerSet::new()),
            once: RefCell::new(ListenerSet::new()),
            dispatching: Cell::new(false),
        }
    }

    /// Adds a persistent listener.
    ///
    /// With `allow_duplicates` false, an equal handle already subscribed as a
    /// persistent listener causes the call to return false without mutating
    /// anything. Returns true if the listener was added.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relay::{Listener, Relay};
    ///
    /// let relay = Relay::<()>::new();
    /// let listener = Listener::new(|()| {});
    ///
    /// assert!(relay.add_listener(listener.clone(), false));
    /// assert!(!relay.add_listener(listener, false));
    /// assert_eq!(relay.listener_count(), 1);
    /// ```
    pub fn add_listener(&self, listener: Listener<A>, allow_duplicates: bool) -> bool {
        #[cfg(feature = "tracker")]
        let identity = (listener.owner_label(), listener.id());

        let added = self.persistent.borrow_mut().add(listener, allow_duplicates);

        #[cfg(feature = "tracker")]
        if added {
            tracker::notify_add(self.id(), identity.0, identity.1);
        }

        added
    }

    /// Adds a once listener, removed automatically after one delivery.
    ///
    /// With `allow_duplicates` false, an equal handle already subscribed as a
    /// once listener causes the call to return false. The persistent set is
    /// not consulted.
    pub fn add_once(&self, listener: Listener<A>, allow_duplicates: bool) -> bool {
        self.once.borrow_mut().add(listener, allow_duplicates)
    }

    /// Adds a persistent listener and returns a binding that can toggle the
    /// subscription on and off later.
    ///
    /// Returns [`None`] without creating a binding if the add was rejected
    /// as a duplicate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relay::{Listener, Relay};
    ///
    /// let relay = Relay::<()>::new();
    ///
    /// let mut binding = relay
    ///     .bind_listener(Listener::new(|()| {}), false)
    ///     .unwrap();
    ///
    /// assert!(binding.is_enabled());
    /// assert!(binding.enable(false));
    /// assert_eq!(relay.listener_count(), 0);
    /// ```
    pub fn bind_listener(
        &self,
        listener: Listener<A>,
        allow_duplicates: bool,
    ) -> Option<RelayBinding<'_, A>> {
        if self.add_listener(listener.clone(), allow_duplicates) {
            Some(RelayBinding::new(self, listener, allow_duplicates, true))
        } else {
            None
        }
    }

    /// Removes a persistent listener, if an equal handle is present.
    ///
    /// Returns true if a listener was removed.
    pub fn remove_listener(&self, listener: &Listener<A>) -> bool {
        let removed = self.persistent.borrow_mut().remove(listener);

        #[cfg(feature = "tracker")]
        if removed {
            tracker::notify_remove(self.id(), listener.owner_label(), listener.id());
        }

        removed
    }

    /// Removes a once listener, if an equal handle is present.
    ///
    /// Returns true if a listener was removed.
    pub fn remove_once(&self, listener: &Listener<A>) -> bool {
        self.once.borrow_mut().remove(listener)
    }

    /// Removes all listeners from the selected sets.
    ///
    /// Captured listener state is released immediately; the underlying
    /// storage capacity is retained.
    pub fn remove_all(&self, persistent: bool, once: bool) {
        if persistent {
            let mut set = self.persistent.borrow_mut();

            #[cfg(feature = "tracker")]
            for entry in set.iter() {
                tracker::notify_remove(self.id(), entry.owner_label(), entry.id());
            }

            set.clear();
        }

        if once {
            self.once.borrow_mut().clear();
        }
    }

    /// Whether an equal handle is subscribed as a persistent listener.
    ///
    /// Once listeners are never consulted.
    #[must_use]
    pub fn contains(&self, listener: &Listener<A>) -> bool {
        self.persistent.borrow().contains(listener)
    }

    /// Number of persistent listeners currently subscribed.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.persistent.borrow().len()
    }

    /// Number of once listeners currently subscribed.
    ///
    /// All current once listeners are removed by the next dispatch.
    #[must_use]
    pub fn once_listener_count(&self) -> usize {
        self.once.borrow().len()
    }

    /// The dispatch-incapable facade over this relay.
    ///
    /// The link exposes the entire subscription surface but no dispatch
    /// operation, making it safe to hand to code that must not be able to
    /// fire the event. Every call returns the same link for the lifetime of
    /// the relay.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relay::{Listener, Relay};
    ///
    /// let relay = Relay::<()>::new();
    /// let link = relay.link();
    ///
    /// link.add_listener(Listener::new(|()| {}), false);
    ///
    /// // Mutations through the link are visible on the relay.
    /// assert_eq!(relay.listener_count(), 1);
    /// ```
    #[must_use]
    pub fn link(&self) -> &RelayLink<A> {
        // SAFETY: RelayLink is a repr(transparent) wrapper around Relay,
        // so the two share one layout and the cast reference stays valid
        // for as long as `self` does.
        unsafe { &*ptr::from_ref(self).cast::<RelayLink<A>>() }
    }

    /// Delivers `args` to every currently subscribed listener, then removes
    /// the once listeners that were delivered to.
    ///
    /// Persistent listeners are visited first, then once listeners; each set
    /// is walked in reverse insertion order. Listeners added during the pass
    /// are not visited until the next dispatch.
    ///
    /// # Panics
    ///
    /// Panics if a listener removed more than itself mid-pass or re-entered
    /// dispatch on this same relay; see [`try_dispatch()`][Self::try_dispatch]
    /// for the non-panicking variant. A panic from a listener itself is not
    /// caught and propagates to the caller, skipping the rest of the pass.
    pub fn dispatch(&self, args: &A) {
        if let Err(error) = self.try_dispatch(args) {
            panic!("relay dispatch aborted: {error}");
        }
    }

    /// Delivers `args` to every currently subscribed listener, reporting
    /// contract violations as an error instead of panicking.
    ///
    /// On [`Err`], delivery to the remaining listeners of the pass was
    /// abandoned; the relay itself remains usable.
    ///
    /// # Errors
    ///
    /// [`DispatchError::SnapshotInvalidated`] if a listener removed more
    /// than itself during the pass; [`DispatchError::Reentered`] if this
    /// relay is already mid-dispatch on this stack.
    pub fn try_dispatch(&self, args: &A) -> Result<(), DispatchError> {
        if self.dispatching.replace(true) {
            return Err(DispatchError::Reentered);
        }

        // Reset on every exit path, including a panicking listener, so the
        // relay stays dispatchable afterwards.
        defer! {
            self.dispatching.set(false);
        }

        // Walking from the snapshot length down to zero is what makes
        // in-dispatch self-removal and addition safe; see the type docs.
        let snapshot = self.persistent.borrow().len();
        for cursor in (0..snapshot).rev() {
            // The borrow is released before the listener runs, so the
            // listener is free to mutate the subscription state.
            let listener = self.persistent.borrow().get(cursor).cloned();

            // A vacant cursor means the live count fell below the snapshot
            // by more than the already-visited entries could account for.
            let Some(listener) = listener else {
                return Err(DispatchError::SnapshotInvalidated {
                    cursor,
                    live: self.persistent.borrow().len(),
                });
            };

            listener.invoke(args);
        }

        let snapshot = self.once.borrow().len();
        for cursor in (0..snapshot).rev() {
            let listener = self.once.borrow().get(cursor).cloned();

            let Some(listener) = listener else {
                return Err(DispatchError::SnapshotInvalidated {
                    cursor,
                    live: self.once.borrow().len(),
                });
            };

            listener.invoke(args);

            // Remove the entry we just delivered to, but only if the slot
            // still holds that same handle. If the listener removed itself
            // inside its own body the slot no longer matches and removing
            // here would take out an innocent neighbour.
            let mut set = self.once.borrow_mut();
            if set.get(cursor) == Some(&listener) {
                set.remove_at(cursor);
            }
        }

        Ok(())
    }

    /// Identity of this relay in tracker records and reports.
    #[cfg(feature = "tracker")]
    #[must_use]
    pub fn id(&self) -> RelayId {
        RelayId::new(ptr::from_ref(self).cast::<()>().addr())
    }
}

impl<A> Default for Relay<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Relay<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for the debug format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("persistent", &self.persistent)
            .field("once", &self.once)
            .field("dispatching", &self.dispatching.get())
            .finish()
    }
}
