use crate::{
    error::{ErrorOrigin, InternalError},
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    sorted::{KeyValue, Order, Seekable, SortedIterator, SortedIteratorExt, iterate_sorted, merge},
    store::{MemCursor, MemStore, RawCursor, SortedStore, StoreSession, scan::prefix_successor},
};
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;

fn session() -> StoreSession<MemStore> {
    StoreSession::new(MemStore::from_entries([
        ("a/1", "x"),
        ("b/1", "b1"),
        ("b/2", "b2"),
        ("b/3", "b3"),
        ("b/5", "b5"),
        ("c/1", "y"),
    ]))
}

fn keys(entries: &[KeyValue]) -> Vec<&[u8]> {
    entries.iter().map(|entry| entry.key().as_ref()).collect()
}

#[derive(Default)]
struct CaptureSink {
    events: Mutex<Vec<MetricsEvent>>,
}

impl MetricsSink for CaptureSink {
    fn record(&self, event: MetricsEvent) {
        self.events.lock().push(event);
    }
}

// ---------------------------------------------------------------------
// memory store
// ---------------------------------------------------------------------

#[test]
fn mem_cursor_seeks_in_both_directions() {
    let store = MemStore::from_entries([("k1", "1"), ("k3", "3"), ("k5", "5")]);
    let mut cursor = store.open_cursor().expect("open should succeed");

    cursor.seek(b"k2");
    assert_eq!(cursor.key(), Some(&b"k3"[..]));
    cursor.seek_for_prev(b"k4");
    assert_eq!(cursor.key(), Some(&b"k3"[..]));
    cursor.seek_for_prev(b"k0");
    assert!(!cursor.valid());
    cursor.seek_to_last();
    assert_eq!(cursor.value(), Some(&b"5"[..]));
    cursor.next();
    assert!(!cursor.valid(), "stepping past the last entry invalidates");
}

#[test]
fn mem_cursor_reads_the_snapshot_it_was_opened_on() {
    let store = MemStore::from_entries([("k1", "1")]);
    let mut cursor = store.open_cursor().expect("open should succeed");

    store.put("k0", "0");
    store.delete(b"k1");
    cursor.seek(b"");

    assert_eq!(cursor.key(), Some(&b"k1"[..]));
    assert_eq!(
        store.get(b"k0").expect("get should succeed"),
        Some(Bytes::from_static(b"0"))
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn prefix_successor_skips_trailing_max_bytes() {
    assert_eq!(prefix_successor(b"ab"), Some(Bytes::from_static(b"ac")));
    assert_eq!(prefix_successor(b"a\xff"), Some(Bytes::from_static(b"b")));
    assert_eq!(prefix_successor(b"\xff\xff"), None);
    assert_eq!(prefix_successor(b""), None);
}

// ---------------------------------------------------------------------
// scan state machine
// ---------------------------------------------------------------------

#[test]
fn scan_yields_prefix_range_ascending() {
    let session = session();

    let out = session
        .iterate("b/", Order::Asc)
        .to_list()
        .expect("scan should succeed");

    assert_eq!(keys(&out), vec![&b"b/1"[..], b"b/2", b"b/3", b"b/5"]);
    assert_eq!(out[0].value().as_ref(), b"b1");
}

#[test]
fn scan_yields_prefix_range_descending() {
    let session = session();

    let out = session
        .iterate("b/", Order::Desc)
        .to_list()
        .expect("scan should succeed");

    assert_eq!(keys(&out), vec![&b"b/5"[..], b"b/3", b"b/2", b"b/1"]);
}

#[test]
fn descending_scan_skips_an_entry_equal_to_the_prefix_successor() {
    let store = MemStore::from_entries([("b/1", "1"), ("b0", "successor"), ("b1", "after")]);
    let session = StoreSession::new(store);

    let out = session
        .iterate("b/", Order::Desc)
        .to_list()
        .expect("scan should succeed");

    assert_eq!(keys(&out), vec![&b"b/1"[..]]);
}

#[test]
fn empty_prefix_scans_everything() {
    let session = session();

    let asc = session.iterate(Bytes::new(), Order::Asc).to_list().expect("scan should succeed");
    let desc = session.iterate(Bytes::new(), Order::Desc).to_list().expect("scan should succeed");

    assert_eq!(asc.len(), 6);
    assert_eq!(keys(&desc).first(), Some(&&b"c/1"[..]));
}

#[test]
fn scan_is_lazy_until_first_pull() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Asc);

    assert!(!scan.is_opened());
    assert_eq!(session.open_scans(), 0);

    assert!(scan.has_next().expect("has_next should succeed"));
    assert!(scan.is_opened());
    assert_eq!(session.open_scans(), 1);
}

#[test]
fn scan_forward_skips_to_target() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Asc);

    scan.forward(&KeyValue::seek_target("b/3"))
        .expect("forward should succeed");
    let out = scan.to_list().expect("drain should succeed");

    assert_eq!(keys(&out), vec![&b"b/3"[..], b"b/5"]);
}

#[test]
fn scan_forward_below_prefix_is_clamped_to_range_start() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Asc);

    scan.forward(&KeyValue::seek_target("a/0"))
        .expect("forward should succeed");

    assert_eq!(
        scan.next().expect("next should succeed").key().as_ref(),
        b"b/1"
    );
}

#[test]
fn descending_scan_forward_lands_at_or_below_target() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Desc);

    assert_eq!(
        scan.next().expect("next should succeed").key().as_ref(),
        b"b/5"
    );
    scan.forward(&KeyValue::seek_target("b/4"))
        .expect("forward should succeed");

    assert_eq!(keys(&scan.to_list().expect("drain should succeed")), vec![&b"b/3"[..], b"b/2", b"b/1"]);
}

#[test]
fn scan_forward_keeps_a_fetched_entry_past_the_target() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Asc);

    assert_eq!(scan.next().expect("next should succeed").key().as_ref(), b"b/1");
    assert!(scan.has_next().expect("has_next should succeed"));
    scan.forward(&KeyValue::seek_target("b/2"))
        .expect("forward should succeed");

    assert_eq!(scan.next().expect("next should succeed").key().as_ref(), b"b/2");
}

#[test]
fn scan_forward_regression_is_an_ordering_violation() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Asc);

    scan.forward(&KeyValue::seek_target("b/3"))
        .expect("forward should succeed");
    let err = scan
        .forward(&KeyValue::seek_target("b/2"))
        .expect_err("regressing forward must fail");

    assert!(err.is_ordering_violation());
    assert_eq!(err.origin, ErrorOrigin::Storage);
}

#[test]
fn exhaustion_releases_and_deregisters_the_scan() {
    let session = session();
    let mut scan = session.iterate("a/", Order::Asc);

    assert_eq!(scan.next().expect("next should succeed").key().as_ref(), b"a/1");
    assert_eq!(session.open_scans(), 1);
    assert!(!scan.has_next().expect("has_next should succeed"));
    assert_eq!(session.open_scans(), 0);

    let err = scan.next().expect_err("next after exhaustion must fail");
    assert!(err.is_no_such_element());
}

#[test]
fn close_is_idempotent_on_an_exhausted_scan() {
    let session = session();
    let sink = Arc::new(CaptureSink::default());

    with_metrics_sink(sink.clone(), || {
        let mut scan = session.iterate("a/", Order::Asc);
        while scan.try_next().expect("drain should succeed").is_some() {}

        scan.close();
        scan.close();
        drop(scan);
    });

    let closes = sink
        .events
        .lock()
        .iter()
        .filter(|event| matches!(event, MetricsEvent::ScanClosed { .. }))
        .count();
    assert_eq!(closes, 1, "a scan releases its cursor exactly once");
    assert_eq!(session.open_scans(), 0);
}

#[test]
fn explicit_close_reports_resource_closed() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Asc);

    assert!(scan.has_next().expect("has_next should succeed"));
    scan.close();

    assert_eq!(session.open_scans(), 0);
    assert!(!scan.has_next().expect("has_next after close should succeed"));
    assert!(scan.next().expect_err("next must fail").is_resource_closed());
    assert!(
        scan.forward(&KeyValue::seek_target("b/9"))
            .expect_err("forward must fail")
            .is_resource_closed()
    );
}

#[test]
fn closing_the_session_fails_open_scans() {
    let session = session();
    let mut scan = session.iterate("b/", Order::Asc);

    assert!(scan.has_next().expect("has_next should succeed"));
    assert_eq!(scan.next().expect("next should succeed").key().as_ref(), b"b/1");
    session.close();

    let err = scan.has_next().expect_err("scan over a closed session must fail");
    assert!(err.is_resource_closed());
    assert_eq!(session.open_scans(), 0);
    assert!(session.get(b"b/1").expect_err("get must fail").is_resource_closed());
}

#[test]
fn dropping_an_open_scan_deregisters_it() {
    let session = session();

    {
        let mut scan = session.iterate("b/", Order::Asc);
        assert!(scan.has_next().expect("has_next should succeed"));
        assert_eq!(session.open_scans(), 1);
    }

    assert_eq!(session.open_scans(), 0);
}

#[test]
fn scan_events_flow_through_the_metrics_sink() {
    let session = session();
    let sink = Arc::new(CaptureSink::default());

    with_metrics_sink(sink.clone(), || {
        let mut scan = session.iterate("b/", Order::Desc);
        scan.forward(&KeyValue::seek_target("b/2"))
            .expect("forward should succeed");
        let out = scan.to_list().expect("drain should succeed");
        assert_eq!(out.len(), 2);
    });

    assert_eq!(
        *sink.events.lock(),
        vec![
            MetricsEvent::ScanOpened { order: Order::Desc },
            MetricsEvent::ScanForwarded,
            MetricsEvent::ScanClosed { rows_read: 2 },
        ]
    );
}

///
/// UnavailableStore
/// Store whose cursors can never be opened.
///

struct UnavailableStore;

impl SortedStore for UnavailableStore {
    type Cursor = MemCursor;

    fn open_cursor(&self) -> Result<MemCursor, InternalError> {
        Err(InternalError::storage_illegal_state("cursor backend unavailable"))
    }

    fn get(&self, _key: &[u8]) -> Result<Option<Bytes>, InternalError> {
        Ok(None)
    }
}

#[test]
fn failed_cursor_open_is_reported_on_every_call() {
    let session = StoreSession::new(UnavailableStore);
    let mut scan = session.iterate("b/", Order::Asc);

    let first = scan.has_next().expect_err("open failure must surface");
    assert!(first.is_illegal_state());

    let again = scan.has_next().expect_err("a failed scan must not look exhausted");
    assert_eq!(again.message, first.message);
    assert!(scan.next().expect_err("next must fail").is_illegal_state());
    assert!(scan.peek().expect_err("peek must fail").is_illegal_state());
    assert!(
        scan.forward(&KeyValue::seek_target("b/9"))
            .expect_err("forward must fail")
            .is_illegal_state()
    );
    assert!(!scan.is_opened());
    assert_eq!(session.open_scans(), 0);
}

#[test]
fn failed_open_during_forward_is_kept() {
    let session = StoreSession::new(UnavailableStore);
    let mut scan = session.iterate("b/", Order::Desc);

    scan.forward(&KeyValue::seek_target("b/2"))
        .expect_err("open failure must surface");

    assert!(scan.has_next().expect_err("failure must persist").is_illegal_state());
}

#[test]
fn rows_read_counts_consumed_entries_only() {
    let session = session();
    let sink = Arc::new(CaptureSink::default());

    with_metrics_sink(sink.clone(), || {
        let mut scan = session.iterate("b/", Order::Asc);
        assert!(scan.has_next().expect("has_next should succeed"));
        scan.forward(&KeyValue::seek_target("b/3"))
            .expect("forward should succeed");
        assert!(scan.has_next().expect("has_next should succeed"));
        assert_eq!(scan.rows_read(), 0, "buffered entries are not read yet");

        let out = scan.to_list().expect("drain should succeed");
        assert_eq!(keys(&out), vec![&b"b/3"[..], b"b/5"]);
    });

    assert!(
        sink.events
            .lock()
            .contains(&MetricsEvent::ScanClosed { rows_read: 2 })
    );
}

// ---------------------------------------------------------------------
// overlay: buffered entries merged onto persisted ones
// ---------------------------------------------------------------------

#[test]
fn buffered_overlay_merges_with_persisted_scan() {
    let session = session();
    let buffered = iterate_sorted(
        Order::Asc,
        [
            KeyValue::new("b/2".into(), "buffered".into()),
            KeyValue::new("b/4".into(), "b4".into()),
        ]
        .into_iter()
        .collect(),
    );

    let out = merge(
        Order::Asc,
        [buffered.boxed(), session.iterate("b/", Order::Asc).boxed()],
    )
    .distinct()
    .to_list()
    .expect("overlay drain should succeed");

    assert_eq!(keys(&out), vec![&b"b/1"[..], b"b/2", b"b/3", b"b/4", b"b/5"]);
    assert_eq!(
        out[1].value().as_ref(),
        b"buffered",
        "the buffered source wins ties because it is merged first"
    );
    assert_eq!(session.open_scans(), 0);
}
