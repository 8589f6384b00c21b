//! Integration tests for the full notification lifecycle.
//!
//! Drives one store through fetch, auto-archive, snooze, bulk read,
//! undo, and wake against a real database file, checking bucket counts
//! and exclusivity at every step.

use std::collections::BTreeSet;
use std::collections::HashSet;

use chrono::{Duration, Utc};
use notibox_core::{
    now_ms, ArchiveRule, Event, NotificationItem, NotificationReason, NotificationStore, StateDb,
};

fn item(id: &str, repo: &str, reason: NotificationReason, updated_at: &str) -> NotificationItem {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "unread": true,
        "reason": reason.as_str(),
        "updated_at": updated_at,
        "subject": { "title": format!("subject {id}"), "type": "Issue" },
        "repository": { "full_name": repo }
    }))
    .unwrap()
}

fn assert_buckets(store: &NotificationStore, active: usize, snoozed: usize, archived: usize) {
    assert_eq!(store.notifications().len(), active, "active bucket size");
    assert_eq!(store.snoozed().len(), snoozed, "snoozed bucket size");
    assert_eq!(store.archived().len(), archived, "archived bucket size");

    let mut seen = HashSet::new();
    for id in store
        .notifications()
        .iter()
        .map(|n| n.id.as_str())
        .chain(store.archived().iter().map(|n| n.id.as_str()))
        .chain(store.snoozed().iter().map(|r| r.notification_id()))
    {
        assert!(seen.insert(id.to_string()), "id {id} in two buckets");
    }
}

#[test]
fn full_lifecycle_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");
    let mut store = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();

    // Fetch ten notifications: three from a muted repo, one stale CI
    // ping, the rest fresh.
    let fresh = (Utc::now() - Duration::hours(1)).to_rfc3339();
    let stale = (Utc::now() - Duration::days(400)).to_rfc3339();
    let mut fetched = vec![
        item("n1", "octo/noisy", NotificationReason::Subscribed, &fresh),
        item("n2", "octo/noisy", NotificationReason::Subscribed, &fresh),
        item("n3", "octo/noisy", NotificationReason::CiActivity, &fresh),
        item("n4", "octo/app", NotificationReason::CiActivity, &stale),
        item("n5", "octo/app", NotificationReason::Mention, &fresh),
        item("n6", "octo/app", NotificationReason::ReviewRequested, &fresh),
    ];
    for i in 7..=10 {
        fetched.push(item(
            &format!("n{i}"),
            "octo/app",
            NotificationReason::Subscribed,
            &fresh,
        ));
    }
    store.ingest(fetched);
    assert_buckets(&store, 10, 0, 0);

    // One repository rule and one age rule; the repo rule is listed
    // first so it claims the muted repo's items.
    let repo_rule = ArchiveRule::repository("octo/noisy").unwrap();
    let repo_rule_id = repo_rule.id;
    store.add_rule(repo_rule);
    store.add_rule(ArchiveRule::max_age(30));

    let report = store.apply_auto_archive_rules();
    assert_eq!(report.archived.len(), 4);
    assert_eq!(report.rule_matches[&repo_rule_id].len(), 3);
    assert_buckets(&store, 6, 0, 4);
    assert_eq!(
        store.rules().iter().map(|r| r.archived_count).sum::<u64>(),
        4
    );

    // Snooze the review request for later.
    let wake_at = now_ms() + 30_000;
    assert!(store.snooze("n6", wake_at));
    assert_buckets(&store, 5, 1, 4);

    // Bulk-read two of the remaining, then undo.
    let ids = vec!["n7".to_string(), "n8".to_string()];
    let affected = store.bulk_mark_as_read(Some(&ids));
    assert_eq!(affected.len(), 2);
    assert_buckets(&store, 3, 1, 4);

    let restored = store.undo_last_mark_as_read();
    assert_eq!(restored.len(), 2);
    assert_buckets(&store, 5, 1, 4);
    assert!(store
        .notifications()
        .iter()
        .filter(|n| ids.contains(&n.id))
        .all(|n| n.unread));

    // The badge covers unread actives only, and the mention flags it.
    let badge = store.badge();
    assert_eq!(badge.count, 5);
    assert!(badge.priority);

    // The snoozed item wakes through the tick loop.
    let events = store.tick(wake_at + 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::SnoozeWoke { id, .. } if id == "n6")));
    assert_buckets(&store, 6, 0, 4);

    // A refetch of the same remote list cannot resurrect the archived
    // items.
    let refetch: Vec<NotificationItem> = (1..=10)
        .map(|i| {
            item(
                &format!("n{i}"),
                if i <= 3 { "octo/noisy" } else { "octo/app" },
                NotificationReason::Subscribed,
                &fresh,
            )
        })
        .collect();
    store.ingest(refetch);
    assert_buckets(&store, 6, 0, 4);
    assert!(!store.notifications().iter().any(|n| n.id == "n1"));

    // Everything survives a flush and reopen.
    store.flush().unwrap();
    let version = store.version();
    drop(store);

    let reopened = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();
    assert_eq!(reopened.version(), version);
    assert_buckets(&reopened, 6, 0, 4);
    assert_eq!(reopened.rules().len(), 2);
}

#[test]
fn reason_rule_sweeps_matching_items() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");
    let mut store = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();

    let reasons: BTreeSet<_> = [NotificationReason::CiActivity].into_iter().collect();
    store.add_rule(ArchiveRule::reasons(reasons).unwrap());

    store.ingest(vec![
        item("a", "octo/app", NotificationReason::CiActivity, "2025-06-08T09:00:00Z"),
        item("b", "octo/app", NotificationReason::Mention, "2025-06-08T09:00:00Z"),
    ]);
    let report = store.apply_auto_archive_rules();
    assert_eq!(report.archived, vec!["a".to_string()]);
    assert_buckets(&store, 1, 0, 1);
}

#[test]
fn malformed_timestamps_surface_as_anomalies_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");
    let mut store = NotificationStore::open(StateDb::open_at(&path).unwrap()).unwrap();

    store.add_rule(ArchiveRule::max_age(7));
    store.ingest(vec![
        item("ok", "octo/app", NotificationReason::Subscribed, "2020-01-01T00:00:00Z"),
        item("bad", "octo/app", NotificationReason::Subscribed, "yesterday-ish"),
    ]);

    let report = store.apply_auto_archive_rules();
    assert_eq!(report.archived, vec!["ok".to_string()]);
    assert_eq!(report.anomalies.len(), 1);
    assert_eq!(report.anomalies[0].notification_id, "bad");
    // The malformed item stays active rather than disappearing.
    assert_buckets(&store, 1, 0, 1);
}
