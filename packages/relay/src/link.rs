use std::fmt;

use crate::{Listener, Relay, RelayBinding};

/// Dispatch-incapable facade over a [`Relay`].
///
/// The link forwards the entire subscription surface to the relay it wraps
/// but has no dispatch operation, so handing one out enforces the intended
/// ownership split at the type level: the relay's owner fires the event,
/// everyone else can only subscribe and unsubscribe.
///
/// Obtained from [`Relay::link()`]; there is exactly one link per relay and
/// it lives as long as the relay does.
///
/// # Example
///
/// ```rust
/// use relay::{Listener, Relay};
///
/// struct Door {
///     opened: Relay<()>,
/// }
///
/// let door = Door {
///     opened: Relay::new(),
/// };
///
/// // Consumers receive the link, never the relay itself.
/// let link = door.opened.link();
/// link.add_listener(Listener::new(|()| println!("creak")), false);
///
/// // Only the owner of `door` can do this.
/// door.opened.dispatch(&());
/// ```
#[repr(transparent)]
pub struct RelayLink<A: 'static> {
    relay: Relay<A>,
}

impl<A> fmt::Debug for RelayLink<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for the debug format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayLink")
            .field("relay", &self.relay)
            .finish()
    }
}

impl<A> RelayLink<A> {
    /// Whether an equal handle is subscribed as a persistent listener.
    ///
    /// Once listeners are never consulted.
    #[must_use]
    pub fn contains(&self, listener: &Listener<A>) -> bool {
        self.relay.contains(listener)
    }

    /// Adds a persistent listener.
    ///
    /// Returns false without mutating anything if the handle is already
    /// subscribed and `allow_duplicates` is false.
    pub fn add_listener(&self, listener: Listener<A>, allow_duplicates: bool) -> bool {
        self.relay.add_listener(listener, allow_duplicates)
    }

    /// Adds a once listener, removed automatically after one delivery.
    pub fn add_once(&self, listener: Listener<A>, allow_duplicates: bool) -> bool {
        self.relay.add_once(listener, allow_duplicates)
    }

    /// Adds a persistent listener and returns a binding that can toggle the
    /// subscription on and off later.
    ///
    /// Returns [`None`] without creating a binding if the add was rejected
    /// as a duplicate.
    pub fn bind_listener(
        &self,
        listener: Listener<A>,
        allow_duplicates: bool,
    ) -> Option<RelayBinding<'_, A>> {
        self.relay.bind_listener(listener, allow_duplicates)
    }

    /// Removes a persistent listener, if an equal handle is present.
    pub fn remove_listener(&self, listener: &Listener<A>) -> bool {
        self.relay.remove_listener(listener)
    }

    /// Removes a once listener, if an equal handle is present.
    pub fn remove_once(&self, listener: &Listener<A>) -> bool {
        self.relay.remove_once(listener)
    }

    /// Removes all listeners from the selected sets.
    pub fn remove_all(&self, persistent: bool, once: bool) {
        self.relay.remove_all(persistent, once);
    }

    /// Number of persistent listeners currently subscribed.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.relay.listener_count()
    }

    /// Number of once listeners currently subscribed.
    #[must_use]
    pub fn once_listener_count(&self) -> usize {
        self.relay.once_listener_count()
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;

    #[test]
    fn link_identity_is_stable() {
        let relay = Relay::<()>::new();

        assert!(ptr::eq(relay.link(), relay.link()));
    }

    #[test]
    fn mutations_through_the_link_are_visible_on_the_relay() {
        let relay = Relay::<()>::new();
        let listener = Listener::new(|()| {});

        assert!(relay.link().add_listener(listener.clone(), false));

        assert_eq!(relay.listener_count(), 1);
        assert!(relay.contains(&listener));
        assert!(relay.link().contains(&listener));

        assert!(relay.link().remove_listener(&listener));
        assert_eq!(relay.link().listener_count(), 0);
    }

    #[test]
    fn mutations_on_the_relay_are_visible_through_the_link() {
        let relay = Relay::<()>::new();
        let listener = Listener::new(|()| {});

        relay.add_listener(listener.clone(), false);
        relay.add_once(Listener::new(|()| {}), false);

        assert_eq!(relay.link().listener_count(), 1);
        assert_eq!(relay.link().once_listener_count(), 1);

        relay.link().remove_all(true, true);

        assert_eq!(relay.listener_count(), 0);
        assert_eq!(relay.once_listener_count(), 0);
    }

    #[test]
    fn binding_created_through_the_link_toggles_the_relay() {
        let relay = Relay::<()>::new();

        let mut binding = relay
            .link()
            .bind_listener(Listener::new(|()| {}), false)
            .unwrap();

        assert_eq!(relay.listener_count(), 1);
        assert!(binding.enable(false));
        assert_eq!(relay.listener_count(), 0);
    }
}
