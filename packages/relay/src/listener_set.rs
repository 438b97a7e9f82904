use std::fmt;

use crate::Listener;

/// Growable, order-preserving storage for listener handles.
///
/// Entries are kept densely packed in insertion order; removal compacts the
/// tail down by one slot so relative order is preserved. Capacity doubles
/// when full, starting from one slot, and never shrinks.
///
/// This is pure storage - dispatch logic lives in [`Relay`][crate::Relay].
pub(crate) struct ListenerSet<A: 'static> {
    entries: Vec<Listener<A>>,
}

impl<A> ListenerSet<A> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a listener, growing capacity if needed.
    ///
    /// When `allow_duplicates` is false and an equal handle is already
    /// present, nothing is appended and false is returned.
    pub(crate) fn add(&mut self, listener: Listener<A>, allow_duplicates: bool) -> bool {
        if !allow_duplicates && self.contains(&listener) {
            return false;
        }

        if self.entries.len() == self.entries.capacity() {
            // Double the capacity, treating an empty set as capacity 1.
            self.entries.reserve_exact(self.entries.capacity().max(1));
        }

        self.entries.push(listener);
        true
    }

    #[must_use]
    pub(crate) fn contains(&self, listener: &Listener<A>) -> bool {
        self.entries.iter().any(|entry| entry == listener)
    }

    /// Removes the first entry equal to `listener`, compacting the tail.
    ///
    /// Returns false if no equal entry is present.
    pub(crate) fn remove(&mut self, listener: &Listener<A>) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry == listener) else {
            return false;
        };

        self.remove_at(index);
        true
    }

    /// Removes the entry at `index`, shifting all later entries down one slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub(crate) fn remove_at(&mut self, index: usize) {
        // Vec::remove shifts the tail down, preserving relative order, and
        // drops the removed handle immediately.
        drop(self.entries.remove(index));
    }

    /// Drops every entry so captured listener state is released promptly.
    ///
    /// Capacity is retained; the set never shrinks.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub(crate) fn get(&self, index: usize) -> Option<&Listener<A>> {
        self.entries.get(index)
    }

    #[cfg(feature = "tracker")]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Listener<A>> {
        self.entries.iter()
    }
}

impl<A> fmt::Debug for ListenerSet<A> {
    #[cfg_attr(test, mutants::skip)] // No API contract for the debug format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn noop() -> Listener<()> {
        Listener::new(|()| {})
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut set = ListenerSet::new();
        let first = noop();
        let second = noop();

        assert!(set.add(first.clone(), false));
        assert!(set.add(second.clone(), false));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0), Some(&first));
        assert_eq!(set.get(1), Some(&second));
    }

    #[test]
    fn add_rejects_duplicate_by_default() {
        let mut set = ListenerSet::new();
        let listener = noop();

        assert!(set.add(listener.clone(), false));
        assert!(!set.add(listener.clone(), false));

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn add_accepts_duplicate_when_allowed() {
        let mut set = ListenerSet::new();
        let listener = noop();

        assert!(set.add(listener.clone(), false));
        assert!(set.add(listener.clone(), true));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn capacity_doubles_from_one() {
        let mut set = ListenerSet::new();

        for _ in 0..5 {
            assert!(set.add(noop(), true));
        }

        // 1 -> 2 -> 4 -> 8.
        assert_eq!(set.entries.capacity(), 8);
    }

    #[test]
    fn remove_compacts_preserving_order() {
        let mut set = ListenerSet::new();
        let first = noop();
        let second = noop();
        let third = noop();

        set.add(first.clone(), false);
        set.add(second.clone(), false);
        set.add(third.clone(), false);

        assert!(set.remove(&second));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0), Some(&first));
        assert_eq!(set.get(1), Some(&third));
    }

    #[test]
    fn remove_absent_is_a_no_op() {
        let mut set = ListenerSet::new();
        set.add(noop(), false);

        assert!(!set.remove(&noop()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_matches_first_of_duplicates() {
        let mut set = ListenerSet::new();
        let duplicated = noop();
        let other = noop();

        set.add(duplicated.clone(), false);
        set.add(other.clone(), false);
        set.add(duplicated.clone(), true);

        assert!(set.remove(&duplicated));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0), Some(&other));
        assert_eq!(set.get(1), Some(&duplicated));
    }

    #[test]
    fn clear_drops_captured_state() {
        let state = Rc::new(Cell::new(0));
        let state_clone = Rc::clone(&state);

        let mut set = ListenerSet::new();
        set.add(
            Listener::<()>::new(move |()| state_clone.set(1)),
            false,
        );

        assert_eq!(Rc::strong_count(&state), 2);

        set.clear();

        assert_eq!(set.len(), 0);
        assert_eq!(Rc::strong_count(&state), 1);
    }

    #[test]
    fn clear_retains_capacity() {
        let mut set = ListenerSet::new();
        for _ in 0..4 {
            set.add(noop(), true);
        }
        let capacity = set.entries.capacity();

        set.clear();

        assert_eq!(set.entries.capacity(), capacity);
    }
}
