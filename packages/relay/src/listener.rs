use std::fmt;
use std::rc::Rc;

#[cfg(feature = "tracker")]
use crate::tracker::ListenerId;

/// An opaque, equality-comparable handle to a callback.
///
/// A listener pairs a callable with its captured state. The handle is cheap to
/// clone; all clones refer to the same underlying callable and compare equal.
/// Two handles built from separate closures never compare equal, even when the
/// closures were written identically, because their captured state is distinct.
///
/// Hold on to a clone of the handle you subscribed with if you intend to
/// remove it later - removal is matched by handle equality.
///
/// The argument type `A` is whatever the owning [`Relay`][crate::Relay] was
/// instantiated with: `()` for no arguments, a bare type for one argument or
/// a tuple for several. The callback receives the arguments by reference.
///
/// # Example
///
/// ```rust
/// use relay::Listener;
///
/// let listener = Listener::<u32>::new(|value| println!("got {value}"));
/// let clone = listener.clone();
///
/// assert_eq!(listener, clone);
/// assert_ne!(listener, Listener::<u32>::new(|value| println!("got {value}")));
/// ```
pub struct Listener<A: 'static> {
    callback: Rc<dyn Fn(&A)>,

    /// Optional owner tag used by the subscription tracker to group report
    /// output. Plays no part in equality.
    #[cfg(feature = "tracker")]
    owner: Option<Rc<str>>,
}

impl<A> Listener<A> {
    /// Creates a listener handle from a callback.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relay::Listener;
    ///
    /// let listener = Listener::new(|(a, b): &(i32, i32)| {
    ///     assert_eq!(a + b, 3);
    /// });
    /// # _ = listener;
    /// ```
    #[must_use]
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&A) + 'static,
    {
        Self {
            callback: Rc::new(callback),
            #[cfg(feature = "tracker")]
            owner: None,
        }
    }

    /// Creates a listener handle tagged with an owner label.
    ///
    /// The label identifies the subscribing component in tracker reports,
    /// which is otherwise hard to reconstruct from a callback address alone.
    #[cfg(feature = "tracker")]
    #[must_use]
    pub fn labeled<F>(owner: impl Into<Rc<str>>, callback: F) -> Self
    where
        F: Fn(&A) + 'static,
    {
        Self {
            callback: Rc::new(callback),
            owner: Some(owner.into()),
        }
    }

    /// The owner label this handle was created with, if any.
    #[cfg(feature = "tracker")]
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    #[cfg(feature = "tracker")]
    pub(crate) fn owner_label(&self) -> Option<Rc<str>> {
        self.owner.clone()
    }

    #[cfg(feature = "tracker")]
    pub(crate) fn id(&self) -> ListenerId {
        ListenerId::new(Rc::as_ptr(&self.callback).cast::<()>().addr())
    }

    pub(crate) fn invoke(&self, args: &A) {
        (self.callback)(args);
    }
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
            #[cfg(feature = "tracker")]
            owner: self.owner.clone(),
        }
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<A> Eq for Listener<A> {}

impl<A> fmt::Debug for Listener<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for the debug format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &Rc::as_ptr(&self.callback))
            .finish()
    }
}
