use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

///
/// EventState
/// Ephemeral, in-memory counters shared by every thread of the process.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub scans: ScanCounters,
    pub sorted: SortedCounters,
    pub producer: ProducerCounters,
}

///
/// ScanCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ScanCounters {
    pub opened_asc: u64,
    pub opened_desc: u64,
    pub forwarded: u64,
    pub closed: u64,
    pub rows_read: u64,
}

///
/// SortedCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SortedCounters {
    pub duplicates_suppressed: u64,
}

///
/// ProducerCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProducerCounters {
    pub workers_started: u64,
    pub workers_finished: u64,
    pub elements_delivered: u64,
    pub queues_done: u64,
    pub recycles: u64,
    pub shared_duplicates_dropped: u64,
}

static EVENT_STATE: LazyLock<Mutex<EventState>> =
    LazyLock::new(|| Mutex::new(EventState::default()));

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    f(&EVENT_STATE.lock())
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut EVENT_STATE.lock())
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
/// Point-in-time counter snapshot for endpoint/test plumbing.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    pub scans_open: u64,
}

/// Build a metrics report by inspecting in-memory counters only.
#[must_use]
pub(crate) fn report() -> EventReport {
    let counters = with_state(Clone::clone);
    let opened = counters
        .scans
        .opened_asc
        .saturating_add(counters.scans.opened_desc);
    let scans_open = opened.saturating_sub(counters.scans.closed);

    EventReport {
        counters,
        scans_open,
    }
}
