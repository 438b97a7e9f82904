use thiserror::Error;

/// Errors that can abort a dispatch pass.
///
/// Both variants indicate a violated usage contract rather than a runtime
/// condition to retry: a listener mutated the relay in a way the dispatch
/// algorithm does not support. Delivery to the remaining listeners of the
/// pass is abandoned; the relay's subscription state stays usable.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum DispatchError {
    /// The live listener count fell below the iteration cursor mid-pass.
    ///
    /// A listener may remove itself during its own invocation, but removing
    /// any other listener (or clearing the set) from inside a dispatch
    /// invalidates the snapshot the pass iterates over.
    #[error(
        "dispatch cursor {cursor} is beyond the {live} remaining listeners: \
         a listener removed more than itself during dispatch"
    )]
    SnapshotInvalidated {
        /// Zero-based index the pass was about to visit.
        cursor: usize,

        /// Live listener count observed at that point.
        live: usize,
    },

    /// Dispatch was called on a relay that is already mid-dispatch.
    ///
    /// The reverse-snapshot algorithm does not compose with itself over the
    /// same listener storage, so same-instance re-entrancy is rejected.
    /// Dispatching a *different* relay from inside a listener is fine.
    #[error("dispatch re-entered on a relay that is already dispatching")]
    Reentered,
}
