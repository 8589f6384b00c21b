//! Integration tests for two-context convergence.
//!
//! The interactive CLI and the watch loop each hold their own store
//! over the same database file with no cross-process lock. These tests
//! interleave writes the way the two contexts do and assert that both
//! sides converge once the dust settles.

use notibox_core::{
    now_ms, ArchiveRule, Event, NotificationItem, NotificationReason, NotificationStore, StateDb,
};

fn item(id: &str) -> NotificationItem {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "unread": true,
        "reason": "subscribed",
        "updated_at": "2025-06-08T09:00:00Z",
        "subject": { "title": format!("subject {id}"), "type": "Issue" },
        "repository": { "full_name": "octo/app" }
    }))
    .unwrap()
}

fn ids(items: &[NotificationItem]) -> Vec<&str> {
    items.iter().map(|n| n.id.as_str()).collect()
}

fn assert_converged(a: &NotificationStore, b: &NotificationStore) {
    assert_eq!(a.version(), b.version());
    assert_eq!(ids(a.notifications()), ids(b.notifications()));
    assert_eq!(ids(a.archived()), ids(b.archived()));
    assert_eq!(
        a.snoozed()
            .iter()
            .map(|r| r.notification_id())
            .collect::<Vec<_>>(),
        b.snoozed()
            .iter()
            .map(|r| r.notification_id())
            .collect::<Vec<_>>()
    );
    assert_eq!(a.badge(), b.badge());
}

#[test]
fn interactive_writes_reach_the_watch_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    // Watch context starts first with an empty store.
    let mut watch = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();

    // Interactive one-shot: ingest and archive, then exit (flush).
    {
        let mut cli = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
        cli.ingest(vec![item("n1"), item("n2"), item("n3")]);
        cli.archive("n1");
        cli.flush().unwrap();
    }

    // The watch loop notices on its next poll and its badge follows.
    assert!(watch.poll_external().unwrap());
    assert_eq!(watch.notifications().len(), 2);
    assert_eq!(watch.archived().len(), 1);
    let events = watch.tick(now_ms() + 60_000);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BadgeUpdated { badge, .. } if badge.count == 2)));
}

#[test]
fn watch_wake_reaches_a_later_interactive_shot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    // Interactive context snoozes with an already-elapsed deadline and
    // exits; nothing is awake to fire it yet.
    {
        let mut cli = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
        cli.ingest(vec![item("n1")]);
        cli.snooze("n1", now_ms() - 5_000);
        cli.flush().unwrap();
    }

    // The watch loop starts, reconciles, fires the wake, and flushes
    // through its tick.
    let mut watch = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
    watch.reconcile_on_startup();
    let events = watch.tick(now_ms() + 60_000);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::SnoozeWoke { id, .. } if id == "n1")));

    // A fresh interactive shot sees the woken, unread item.
    let cli = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
    assert_eq!(cli.notifications().len(), 1);
    assert!(cli.notifications()[0].unread);
    assert!(cli.snoozed().is_empty());
    assert_converged(&cli, &watch);
}

#[test]
fn concurrent_writers_converge_on_the_last_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    let mut a = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
    let mut b = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();

    a.ingest(vec![item("n1"), item("n2")]);
    a.flush().unwrap();
    assert!(b.poll_external().unwrap());

    // Both mutate without seeing each other; A lands first, B second.
    a.archive("n1");
    b.bulk_mark_as_read(Some(&["n2".to_string()]));
    a.flush().unwrap();
    b.flush().unwrap();

    // B's write carries the higher version, so both settle on it.
    assert!(a.poll_external().unwrap());
    assert!(!b.poll_external().unwrap());
    assert_converged(&a, &b);
    // Last write wins: B never saw the archive, so n1 is active again.
    assert_eq!(ids(a.notifications()), vec!["n1"]);
}

#[test]
fn rule_changes_from_one_context_apply_in_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    let mut a = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
    let mut b = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();

    a.add_rule(ArchiveRule::repository("octo/app").unwrap());
    a.flush().unwrap();

    assert!(b.poll_external().unwrap());
    b.ingest(vec![item("n1")]);
    let report = b.apply_auto_archive_rules();
    assert_eq!(report.archived.len(), 1);
    b.flush().unwrap();

    assert!(a.poll_external().unwrap());
    assert_eq!(a.rules()[0].archived_count, 1);
    assert_converged(&a, &b);
}

#[test]
fn quiescent_stores_stay_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    let mut a = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
    let mut b = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();

    a.ingest(vec![item("n1")]);
    a.flush().unwrap();
    assert!(b.poll_external().unwrap());

    // No further writes: repeated polls and ticks change nothing.
    for _ in 0..3 {
        assert!(!a.poll_external().unwrap());
        assert!(!b.poll_external().unwrap());
        a.tick(now_ms() + 120_000);
        b.tick(now_ms() + 120_000);
    }
    assert_converged(&a, &b);
    assert_eq!(a.version(), 1);
}
