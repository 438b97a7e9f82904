use std::fmt;

use crate::{Listener, Relay};

/// A toggleable pairing of one listener with one [`Relay`].
///
/// The binding remembers the listener handle so callers do not have to, and
/// exposes a single [`enable()`][Self::enable] switch that subscribes or
/// unsubscribes it. This suits components that repeatedly suspend and resume
/// their interest in an event, such as UI elements that stop listening while
/// hidden.
///
/// A binding starts enabled when created through
/// [`Relay::bind_listener()`]. Dropping a binding does not unsubscribe the
/// listener; disable it first if that is the intent.
///
/// # Example
///
/// ```rust
/// use relay::{Listener, Relay};
///
/// let relay = Relay::<()>::new();
/// let mut binding = relay
///     .bind_listener(Listener::new(|()| println!("ping")), false)
///     .unwrap();
///
/// relay.dispatch(&()); // prints
///
/// binding.enable(false);
/// relay.dispatch(&()); // silent
///
/// binding.enable(true);
/// relay.dispatch(&()); // prints again
/// ```
pub struct RelayBinding<'r, A: 'static> {
    relay: &'r Relay<A>,
    listener: Listener<A>,
    allow_duplicates: bool,
    enabled: bool,
}

impl<'r, A> RelayBinding<'r, A> {
    /// Creates a binding pairing `listener` with `relay`.
    ///
    /// This only records the pairing; it does not subscribe or unsubscribe
    /// anything. Pass `enabled` to match the listener's actual subscription
    /// state at the time of creation - [`Relay::bind_listener()`] does this
    /// for you and is the usual way to obtain a binding.
    #[must_use]
    pub const fn new(
        relay: &'r Relay<A>,
        listener: Listener<A>,
        allow_duplicates: bool,
        enabled: bool,
    ) -> Self {
        Self {
            relay,
            listener,
            allow_duplicates,
            enabled,
        }
    }

    /// Subscribes or unsubscribes the bound listener.
    ///
    /// Returns true if the subscription state actually changed. Asking for
    /// the state the binding is already in is a no-op returning false, as is
    /// an enable rejected because the listener is already subscribed
    /// elsewhere and duplicates are not allowed.
    pub fn enable(&mut self, enable: bool) -> bool {
        if enable {
            if !self.enabled && self.relay.add_listener(self.listener.clone(), self.allow_duplicates)
            {
                self.enabled = true;
                return true;
            }
        } else if self.enabled && self.relay.remove_listener(&self.listener) {
            self.enabled = false;
            return true;
        }

        false
    }

    /// Whether the bound listener is currently subscribed via this binding.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether enabling will add the listener even if an equal handle is
    /// already subscribed.
    #[must_use]
    pub fn allow_duplicates(&self) -> bool {
        self.allow_duplicates
    }

    /// Changes the duplicate policy for future [`enable()`][Self::enable]
    /// calls. The current subscription state is unaffected.
    pub fn set_allow_duplicates(&mut self, allow_duplicates: bool) {
        self.allow_duplicates = allow_duplicates;
    }

    /// Number of persistent listeners on the bound relay.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.relay.listener_count()
    }
}

impl<A> fmt::Debug for RelayBinding<'_, A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for the debug format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayBinding")
            .field("listener", &self.listener)
            .field("allow_duplicates", &self.allow_duplicates)
            .field("enabled", &self.enabled)
            .finish()
    }
}
