//! Diagnostic tracking of relay subscriptions.
//!
//! A relay has no idea who its subscribers are beyond their callback
//! addresses, which makes a leaked listener hard to trace back to the code
//! that added it. When a [`RelayTracker`] is installed, every persistent
//! subscribe and unsubscribe is recorded against the listener's owner label,
//! and [`report()`][RelayTracker::report] renders what is still subscribed,
//! grouped by owner, together with the backtrace of each add.
//!
//! The tracker is a pure side-observer: relays behave identically whether or
//! not one is installed, and nothing in the dispatch hot path ever consults
//! it. It is also explicit state with an explicit lifecycle - construct it,
//! [`install()`][RelayTracker::install] it, and take it down again with
//! [`RelayTracker::uninstall()`] - rather than an always-on ambient
//! singleton. One tracker slot exists per thread, matching the relay's
//! single-threaded model.
//!
//! Backtraces are captured only in builds with `debug_assertions` enabled
//! and when `RUST_BACKTRACE` asks for them; release builds record
//! subscription counts only.
//!
//! # Example
//!
//! ```rust
//! use relay::tracker::RelayTracker;
//! use relay::{Listener, Relay};
//!
//! let tracker = RelayTracker::new();
//! tracker.install();
//!
//! let relay = Relay::<()>::new();
//! relay.add_listener(Listener::labeled("audio", |()| {}), false);
//!
//! let report = tracker.report();
//! assert!(report.contains("audio"));
//!
//! RelayTracker::uninstall();
//! ```

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Write;
#[cfg(not(debug_assertions))]
use std::marker::PhantomData;
use std::rc::Rc;

#[cfg(debug_assertions)]
type BacktraceType = Backtrace;
#[cfg(not(debug_assertions))]
type BacktraceType = PhantomData<Backtrace>;

/// Captures a backtrace of the current stack, if both `debug_assertions`
/// and `RUST_BACKTRACE` allow it. Costs nothing in release builds.
fn capture_backtrace() -> BacktraceType {
    #[cfg(debug_assertions)]
    {
        Backtrace::capture()
    }
    #[cfg(not(debug_assertions))]
    {
        PhantomData
    }
}

#[cfg(debug_assertions)]
fn render_backtrace(trace: &BacktraceType) -> Option<String> {
    use std::backtrace::BacktraceStatus;

    if trace.status() == BacktraceStatus::Captured {
        Some(trace.to_string())
    } else {
        None
    }
}

#[cfg(not(debug_assertions))]
#[cfg_attr(test, mutants::skip)] // Trivially absent in release builds.
fn render_backtrace(_trace: &BacktraceType) -> Option<String> {
    None
}

/// Identity of a relay in tracker records, derived from its address.
///
/// Obtained from [`Relay::id()`][crate::Relay::id] to correlate a relay you
/// hold with the entries of a report.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RelayId(usize);

impl RelayId {
    pub(crate) const fn new(address: usize) -> Self {
        Self(address)
    }
}

/// Identity of a listener callback in tracker records, derived from the
/// address of its captured state. Clones of one handle share an identity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListenerId(usize);

impl ListenerId {
    pub(crate) const fn new(address: usize) -> Self {
        Self(address)
    }
}

/// A read-only snapshot of one live subscription known to the tracker.
#[derive(Clone, Debug)]
pub struct Subscription {
    owner: Option<Rc<str>>,
    relay: RelayId,
    listener: ListenerId,
    copies: usize,
}

impl Subscription {
    /// The owner label the listener was created with, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The relay subscribed to.
    #[must_use]
    pub fn relay(&self) -> RelayId {
        self.relay
    }

    /// The subscribed listener.
    #[must_use]
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    /// How many copies of the listener are subscribed (more than one only
    /// when duplicates were allowed at add time).
    #[must_use]
    pub fn copies(&self) -> usize {
        self.copies
    }
}

#[derive(Debug)]
struct Record {
    owner: Option<Rc<str>>,
    copies: usize,

    /// One backtrace per add. There is no way to relate a removal to the
    /// add that caused it, so traces accumulate until the last copy is
    /// unsubscribed.
    add_backtraces: Vec<BacktraceType>,
}

/// Records every persistent subscribe and unsubscribe of every relay on the
/// installing thread.
///
/// See the [module documentation][self] for the intended workflow.
#[derive(Debug)]
pub struct RelayTracker {
    recording: Cell<bool>,
    records: RefCell<HashMap<(RelayId, ListenerId), Record>>,
}

thread_local! {
    static INSTALLED: RefCell<Option<Rc<RelayTracker>>> = const { RefCell::new(None) };
}

impl RelayTracker {
    /// Creates a tracker with recording enabled. It observes nothing until
    /// [`install()`][Self::install]ed.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            recording: Cell::new(true),
            records: RefCell::new(HashMap::new()),
        })
    }

    /// Makes this tracker the observer of all relay subscriptions on the
    /// current thread, replacing any previously installed tracker.
    pub fn install(self: &Rc<Self>) {
        INSTALLED.with_borrow_mut(|slot| *slot = Some(Rc::clone(self)));
    }

    /// Removes the currently installed tracker of this thread, if any.
    pub fn uninstall() {
        INSTALLED.with_borrow_mut(|slot| *slot = None);
    }

    /// Whether new subscriptions are currently being recorded.
    ///
    /// Unsubscriptions are always accounted for while installed, so that
    /// toggling recording off and on does not leave stale entries behind.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.get()
    }

    /// Turns recording of new subscriptions on or off.
    pub fn set_recording(&self, recording: bool) {
        self.recording.set(recording);
    }

    /// Discards every record, keeping the tracker installed and its
    /// recording flag as-is.
    pub fn reset(&self) {
        self.records.borrow_mut().clear();
    }

    /// Snapshot of all live subscriptions, ordered by relay and listener
    /// identity.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        let records = self.records.borrow();

        let mut subscriptions = records
            .iter()
            .map(|(&(relay, listener), record)| Subscription {
                owner: record.owner.clone(),
                relay,
                listener,
                copies: record.copies,
            })
            .collect::<Vec<_>>();

        subscriptions.sort_by_key(|subscription| (subscription.relay, subscription.listener));
        subscriptions
    }

    /// Renders every live subscription, grouped by owner label, including
    /// the recorded add backtraces.
    #[must_use]
    pub fn report(&self) -> String {
        let subscriptions = self.subscriptions();

        let mut owners = subscriptions
            .iter()
            .map(Subscription::owner)
            .collect::<Vec<_>>();
        owners.sort_unstable();
        owners.dedup();

        let mut output = format!("{} live relay subscription(s)\n", subscriptions.len());
        for owner in owners {
            output.push_str(&self.report_for_owner(owner));
        }

        output
    }

    /// Renders the live subscriptions of one owner label.
    #[must_use]
    pub fn report_for(&self, owner: &str) -> String {
        self.report_for_owner(Some(owner))
    }

    fn report_for_owner(&self, owner: Option<&str>) -> String {
        let mut output = format!("owner {}:\n", owner.unwrap_or("(unlabeled)"));

        let records = self.records.borrow();
        let mut entries = records
            .iter()
            .filter(|(_, record)| record.owner.as_deref() == owner)
            .collect::<Vec<_>>();
        entries.sort_by_key(|(&key, _)| key);

        for (&(relay, listener), record) in entries {
            _ = writeln!(
                output,
                "  {relay:?} <- {listener:?} x{}",
                record.copies
            );

            for trace in &record.add_backtraces {
                if let Some(rendered) = render_backtrace(trace) {
                    _ = writeln!(output, "    added at:\n{rendered}");
                }
            }
        }

        output
    }
}

/// Records one successful persistent subscribe, if a tracker is installed
/// and recording.
pub(crate) fn notify_add(relay: RelayId, owner: Option<Rc<str>>, listener: ListenerId) {
    with_installed(|tracker| {
        if !tracker.recording.get() {
            return;
        }

        let mut records = tracker.records.borrow_mut();
        let record = records.entry((relay, listener)).or_insert_with(|| Record {
            owner,
            copies: 0,
            add_backtraces: Vec::new(),
        });

        record.copies = record.copies.saturating_add(1);
        record.add_backtraces.push(capture_backtrace());
    });
}

/// Records one successful persistent unsubscribe, if a tracker is installed.
///
/// Removals of subscriptions that were never recorded (recording was off at
/// add time, or the tracker was installed later) are silently ignored.
pub(crate) fn notify_remove(relay: RelayId, _owner: Option<Rc<str>>, listener: ListenerId) {
    with_installed(|tracker| {
        let mut records = tracker.records.borrow_mut();

        let Some(record) = records.get_mut(&(relay, listener)) else {
            return;
        };

        record.copies = record.copies.saturating_sub(1);
        if record.copies == 0 {
            records.remove(&(relay, listener));
        }
    });
}

fn with_installed(f: impl FnOnce(&RelayTracker)) {
    INSTALLED.with_borrow(|slot| {
        if let Some(tracker) = slot {
            f(tracker);
        }
    });
}
