//! The notification store: single source of truth for the inbox.
//!
//! Mutations run synchronously against in-memory state and are
//! fire-and-forget from the caller's point of view. Durability is a
//! debounced write of one versioned JSON envelope that both execution
//! contexts (interactive one-shots and the watch loop) share through
//! SQLite. There is no cross-context lock: the monotonic version lets a
//! context notice the other's writes, and the last write wins.
//!
//! Buckets are mutually exclusive. An id lives in exactly one of
//! active, snoozed, or archived; mark-as-read removes the item outright
//! instead of keeping a read copy anywhere.

pub mod state;

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use crate::badge::{project_badge, Badge};
use crate::error::{CoreError, PersistenceError};
use crate::events::Event;
use crate::model::{FilterCounts, InboxFilter, NotificationItem};
use crate::rules::{self, ArchiveRule, DataAnomaly};
use crate::snooze::{SnoozeRecord, TimerWheel, WakeScheduler};
use crate::storage::StateDb;

use state::InboxState;

const DEFAULT_DEBOUNCE_MS: i64 = 100;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Snapshot taken by a bulk mark-as-read, consumed by undo. Holds the
/// previously-unread items in full so undo works even after the active
/// bucket has been replaced by a fetch. Rides in the envelope so a
/// later invocation can still undo.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UndoSnapshot {
    items: Vec<NotificationItem>,
}

impl UndoSnapshot {
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|n| n.id.clone()).collect()
    }
}

/// Result of an auto-archive pass (committed or previewed).
#[derive(Debug, Default, serde::Serialize)]
pub struct ApplyReport {
    /// Ids archived (or that would be archived, for a preview).
    pub archived: Vec<String>,
    /// Rule id to the ids it claimed.
    pub rule_matches: HashMap<Uuid, Vec<String>>,
    pub anomalies: Vec<DataAnomaly>,
}

/// The store. One instance per execution context.
pub struct NotificationStore {
    state: InboxState,
    version: u64,
    db: StateDb,
    scheduler: Box<dyn WakeScheduler>,
    selection: HashSet<String>,
    remote_error: Option<String>,
    last_write_error: Option<String>,
    last_emitted_badge: Option<Badge>,
    events: Vec<Event>,
    dirty: bool,
    write_due_ms: Option<i64>,
    badge_due_ms: Option<i64>,
    write_debounce_ms: i64,
    badge_debounce_ms: i64,
}

impl NotificationStore {
    /// Open a store over the given database with the built-in timer
    /// wheel.
    pub fn open(db: StateDb) -> Result<Self, CoreError> {
        Self::with_scheduler(db, Box::new(TimerWheel::new()))
    }

    /// Open a store with a caller-provided wake scheduler.
    pub fn with_scheduler(
        db: StateDb,
        scheduler: Box<dyn WakeScheduler>,
    ) -> Result<Self, CoreError> {
        let (state, version) = match db.load()? {
            Some(row) => {
                let state: InboxState = serde_json::from_str(&row.payload)
                    .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
                (state, row.version)
            }
            None => (InboxState::default(), 0),
        };
        Ok(Self {
            state,
            version,
            db,
            scheduler,
            selection: HashSet::new(),
            remote_error: None,
            last_write_error: None,
            last_emitted_badge: None,
            events: Vec::new(),
            dirty: false,
            write_due_ms: None,
            badge_due_ms: None,
            write_debounce_ms: DEFAULT_DEBOUNCE_MS,
            badge_debounce_ms: DEFAULT_DEBOUNCE_MS,
        })
    }

    /// Override the debounce windows (from config).
    pub fn set_debounce_windows(&mut self, write_ms: u64, badge_ms: u64) {
        self.write_debounce_ms = write_ms as i64;
        self.badge_debounce_ms = badge_ms as i64;
    }

    fn touch_write(&mut self) {
        self.dirty = true;
        self.write_due_ms = Some(now_ms() + self.write_debounce_ms);
    }

    fn touch_badge(&mut self) {
        self.badge_due_ms = Some(now_ms() + self.badge_debounce_ms);
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Replace the active bucket with a fetched snapshot, dropping ids
    /// that are archived or snoozed locally. Clears the transient
    /// remote error.
    pub fn ingest(&mut self, fetched: Vec<NotificationItem>) {
        let keep: Vec<NotificationItem> = fetched
            .into_iter()
            .filter(|n| !self.state.is_archived(&n.id) && !self.state.is_snoozed(&n.id))
            .collect();
        self.state.notifications = keep;
        self.state.last_fetched = Some(Utc::now());
        self.remote_error = None;
        self.touch_write();
        self.touch_badge();
    }

    /// Remove an active notification entirely. There is no read resting
    /// state; the remote push happens at the caller's layer. Returns
    /// false for unknown ids.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        let Some(pos) = self.state.notifications.iter().position(|n| n.id == id) else {
            return false;
        };
        self.state.notifications.remove(pos);
        self.selection.remove(id);
        self.touch_write();
        self.touch_badge();
        true
    }

    /// Move an id from active or snoozed into the archive. Archiving is
    /// terminal. Already-archived and unknown ids are no-ops; returns
    /// whether the id transitioned.
    pub fn archive(&mut self, id: &str) -> bool {
        if self.state.is_archived(id) {
            return false;
        }
        if let Some(pos) = self.state.notifications.iter().position(|n| n.id == id) {
            let item = self.state.notifications.remove(pos);
            self.state.archived_notifications.push(item);
            self.selection.remove(id);
            self.touch_write();
            self.touch_badge();
            return true;
        }
        if let Some(pos) = self
            .state
            .snoozed_notifications
            .iter()
            .position(|r| r.notification_id() == id)
        {
            let record = self.state.snoozed_notifications.remove(pos);
            self.scheduler.cancel(&record.timer_name);
            self.state.archived_notifications.push(record.notification);
            self.touch_write();
            return true;
        }
        false
    }

    /// Move an active notification into the snoozed bucket and arm its
    /// wake timer. A deadline already in the past fires on the next
    /// tick. Returns false when the id is not active.
    pub fn snooze(&mut self, id: &str, wake_at_ms: i64) -> bool {
        let Some(pos) = self.state.notifications.iter().position(|n| n.id == id) else {
            return false;
        };
        let item = self.state.notifications.remove(pos);
        let record = SnoozeRecord::new(item, Utc::now(), wake_at_ms);
        self.scheduler.register(&record.timer_name, wake_at_ms);
        self.state.snoozed_notifications.push(record);
        self.selection.remove(id);
        self.touch_write();
        self.touch_badge();
        true
    }

    /// Return a snoozed notification to the active bucket, forcing it
    /// unread so it cannot silently drown. Used both by timer fire and
    /// by manual unsnooze.
    pub fn wake(&mut self, id: &str) -> bool {
        let Some(pos) = self
            .state
            .snoozed_notifications
            .iter()
            .position(|r| r.notification_id() == id)
        else {
            return false;
        };
        let record = self.state.snoozed_notifications.remove(pos);
        self.scheduler.cancel(&record.timer_name);
        let mut item = record.notification;
        item.unread = true;
        self.state.notifications.push(item);
        self.events.push(Event::SnoozeWoke {
            id: id.to_string(),
            at: Utc::now(),
        });
        self.touch_write();
        self.touch_badge();
        true
    }

    /// Remove the given ids (or every active item when `ids` is `None`)
    /// from the active bucket, snapshotting the previously-unread items
    /// for undo. Overwrites any prior snapshot. Returns the affected
    /// ids.
    pub fn bulk_mark_as_read(&mut self, ids: Option<&[String]>) -> Vec<String> {
        let affected: Vec<NotificationItem> = match ids {
            None => std::mem::take(&mut self.state.notifications),
            Some(list) => {
                let mut taken = Vec::new();
                self.state.notifications.retain(|n| {
                    if list.iter().any(|id| id == &n.id) {
                        taken.push(n.clone());
                        false
                    } else {
                        true
                    }
                });
                taken
            }
        };
        let snapshot: Vec<NotificationItem> =
            affected.iter().filter(|n| n.unread).cloned().collect();
        self.state.undo_slot = Some(UndoSnapshot { items: snapshot });
        if affected.is_empty() {
            // The slot itself is envelope state.
            self.touch_write();
            return Vec::new();
        }
        for item in &affected {
            self.selection.remove(&item.id);
        }
        self.touch_write();
        self.touch_badge();
        affected.into_iter().map(|n| n.id).collect()
    }

    /// Restore the last bulk snapshot: snapshotted ids come back unread
    /// unless they have since been archived or snoozed. Consumes the
    /// slot either way. Returns the restored ids.
    pub fn undo_last_mark_as_read(&mut self) -> Vec<String> {
        let Some(snapshot) = self.state.undo_slot.take() else {
            return Vec::new();
        };
        let mut restored = Vec::new();
        for mut item in snapshot.items {
            let id = item.id.clone();
            if self.state.is_archived(&id) || self.state.is_snoozed(&id) {
                continue;
            }
            match self.state.notifications.iter_mut().find(|n| n.id == id) {
                Some(existing) => existing.unread = true,
                None => {
                    item.unread = true;
                    self.state.notifications.push(item);
                }
            }
            restored.push(id);
        }
        // Consuming the slot changes the envelope even when nothing
        // came back.
        self.touch_write();
        if !restored.is_empty() {
            self.touch_badge();
        }
        restored
    }

    /// Archive each id in turn. Returns the ids that transitioned.
    pub fn bulk_archive(&mut self, ids: &[String]) -> Vec<String> {
        let mut archived = Vec::new();
        for id in ids {
            if self.archive(id) {
                archived.push(id.clone());
            }
        }
        archived
    }

    /// Record a remote fetch/push failure. Transient: never persisted,
    /// cleared by the next successful ingest.
    pub fn note_remote_failure(&mut self, op: &str, message: &str) {
        self.remote_error = Some(message.to_string());
        self.events.push(Event::RemoteSyncFailed {
            op: op.to_string(),
            message: message.to_string(),
            at: Utc::now(),
        });
    }

    // ── Rules ───────────────────────────────────────────────────────────

    /// Add a rule built by one of the [`ArchiveRule`] factories.
    pub fn add_rule(&mut self, rule: ArchiveRule) {
        self.state.auto_archive_rules.push(rule);
        self.touch_write();
    }

    /// Flip a rule's enabled flag. Returns the new state, or `None` for
    /// unknown ids. Never retroactively unarchives.
    pub fn toggle_rule(&mut self, id: Uuid) -> Option<bool> {
        let rule = self
            .state
            .auto_archive_rules
            .iter_mut()
            .find(|r| r.id == id)?;
        rule.enabled = !rule.enabled;
        let enabled = rule.enabled;
        self.touch_write();
        Some(enabled)
    }

    /// Delete a rule. Its past archivals stay archived.
    pub fn delete_rule(&mut self, id: Uuid) -> bool {
        let before = self.state.auto_archive_rules.len();
        self.state.auto_archive_rules.retain(|r| r.id != id);
        let removed = self.state.auto_archive_rules.len() != before;
        if removed {
            self.touch_write();
        }
        removed
    }

    /// Evaluate all rules over the active bucket and commit the
    /// outcome: matches move to the archive and the winning rules'
    /// lifetime counters grow.
    pub fn apply_auto_archive_rules(&mut self) -> ApplyReport {
        let now = Utc::now();
        let outcome = rules::apply_rules(
            &self.state.notifications,
            &self.state.auto_archive_rules,
            now,
        );
        if outcome.to_archive.is_empty() {
            return ApplyReport {
                archived: Vec::new(),
                rule_matches: outcome.rule_matches,
                anomalies: outcome.anomalies,
            };
        }
        for (rule_id, ids) in &outcome.rule_matches {
            if let Some(rule) = self
                .state
                .auto_archive_rules
                .iter_mut()
                .find(|r| r.id == *rule_id)
            {
                rule.archived_count += ids.len() as u64;
            }
        }
        let archived_ids: Vec<String> = outcome.to_archive.iter().map(|n| n.id.clone()).collect();
        for id in &archived_ids {
            self.selection.remove(id);
        }
        self.state.notifications = outcome.to_keep;
        self.state
            .archived_notifications
            .extend(outcome.to_archive);
        self.events.push(Event::RulesApplied {
            archived: archived_ids.len(),
            at: now,
        });
        self.touch_write();
        self.touch_badge();
        ApplyReport {
            archived: archived_ids,
            rule_matches: outcome.rule_matches,
            anomalies: outcome.anomalies,
        }
    }

    /// Dry-run evaluation: the report of what [`Self::apply_auto_archive_rules`]
    /// would do, with no mutation at all.
    pub fn preview_auto_archive(&self) -> ApplyReport {
        let outcome = rules::apply_rules(
            &self.state.notifications,
            &self.state.auto_archive_rules,
            Utc::now(),
        );
        ApplyReport {
            archived: outcome.to_archive.iter().map(|n| n.id.clone()).collect(),
            rule_matches: outcome.rule_matches,
            anomalies: outcome.anomalies,
        }
    }

    /// Set the persisted list filter.
    pub fn set_filter(&mut self, filter: InboxFilter) {
        if self.state.active_filter != filter {
            self.state.active_filter = filter;
            self.touch_write();
        }
    }

    // ── Selection ───────────────────────────────────────────────────────
    // Session-only state: never persisted, and reads intersect with the
    // active bucket so stale ids cannot leak into bulk operations.

    /// Toggle selection of an active id. Unknown ids are a no-op.
    pub fn toggle_select(&mut self, id: &str) -> bool {
        if !self.state.is_active(id) {
            return false;
        }
        if !self.selection.insert(id.to_string()) {
            self.selection.remove(id);
        }
        true
    }

    /// Select everything visible under the current filter.
    pub fn select_all(&mut self) {
        let filter = self.state.active_filter;
        self.selection = self
            .state
            .notifications
            .iter()
            .filter(|n| filter.admits(n.reason))
            .map(|n| n.id.clone())
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.state
            .notifications
            .iter()
            .filter(|n| self.selection.contains(&n.id))
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected_ids().len()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn notifications(&self) -> &[NotificationItem] {
        &self.state.notifications
    }

    /// Active items admitted by the persisted filter.
    pub fn filtered_notifications(&self) -> Vec<NotificationItem> {
        let filter = self.state.active_filter;
        self.state
            .notifications
            .iter()
            .filter(|n| filter.admits(n.reason))
            .cloned()
            .collect()
    }

    pub fn filter_counts(&self) -> FilterCounts {
        FilterCounts::tally(&self.state.notifications)
    }

    pub fn active_filter(&self) -> InboxFilter {
        self.state.active_filter
    }

    pub fn badge(&self) -> Badge {
        project_badge(&self.state.notifications)
    }

    pub fn snoozed(&self) -> &[SnoozeRecord] {
        &self.state.snoozed_notifications
    }

    pub fn archived(&self) -> &[NotificationItem] {
        &self.state.archived_notifications
    }

    pub fn rules(&self) -> &[ArchiveRule] {
        &self.state.auto_archive_rules
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_fetched(&self) -> Option<chrono::DateTime<Utc>> {
        self.state.last_fetched
    }

    pub fn remote_error(&self) -> Option<&str> {
        self.remote_error.as_deref()
    }

    pub fn last_write_error(&self) -> Option<&str> {
        self.last_write_error.as_deref()
    }

    pub fn has_undo(&self) -> bool {
        self.state.undo_slot.is_some()
    }

    pub fn has_pending_write(&self) -> bool {
        self.dirty
    }

    // ── Clock and durability ────────────────────────────────────────────

    /// Advance the store's clock: fire due wake timers, emit a badge
    /// update if its debounce elapsed, and flush a due debounced write.
    /// Returns the events produced so far.
    pub fn tick(&mut self, now_ms: i64) -> Vec<Event> {
        let fired = self.scheduler.due(now_ms);
        for name in fired {
            let id = self
                .state
                .snoozed_notifications
                .iter()
                .find(|r| r.timer_name == name)
                .map(|r| r.notification_id().to_string());
            if let Some(id) = id {
                self.wake(&id);
            }
        }
        if let Some(due) = self.badge_due_ms {
            if due <= now_ms {
                self.badge_due_ms = None;
                let badge = self.badge();
                if self.last_emitted_badge != Some(badge) {
                    self.last_emitted_badge = Some(badge);
                    self.events.push(Event::BadgeUpdated {
                        badge,
                        at: Utc::now(),
                    });
                }
            }
        }
        if self.dirty {
            if let Some(due) = self.write_due_ms {
                if due <= now_ms {
                    if let Err(e) = self.flush_inner() {
                        // In-memory state stays authoritative; retry on
                        // a later tick.
                        self.last_write_error = Some(e.to_string());
                        self.write_due_ms = Some(now_ms + self.write_debounce_ms);
                    }
                }
            }
        }
        self.take_events()
    }

    /// Write now if anything is pending, skipping the debounce window.
    /// Interactive one-shots call this before exiting.
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        if !self.dirty {
            return Ok(());
        }
        self.flush_inner()
    }

    fn flush_inner(&mut self) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(&self.state)
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;
        // Versions stay monotonic across contexts: the write itself
        // allocates MAX(stored, ours) + 1 in a single statement, so a
        // flush racing the other context's cannot mint the same version.
        let version = self.db.save(self.version, &payload)?;
        self.version = version;
        self.dirty = false;
        self.write_due_ms = None;
        self.last_write_error = None;
        self.events.push(Event::StateCommitted {
            version,
            notifications: self.state.notifications.clone(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Check whether the other context has written a newer version and
    /// adopt it if so. A store with unflushed local changes defers;
    /// its own write supersedes (last write wins). Returns whether
    /// state was adopted.
    pub fn poll_external(&mut self) -> Result<bool, PersistenceError> {
        if self.dirty {
            return Ok(false);
        }
        let Some(stored) = self.db.current_version()? else {
            return Ok(false);
        };
        if stored <= self.version {
            return Ok(false);
        }
        let Some(row) = self.db.load()? else {
            return Ok(false);
        };
        let incoming: InboxState = serde_json::from_str(&row.payload)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        let old_names: Vec<String> = self
            .state
            .snoozed_notifications
            .iter()
            .map(|r| r.timer_name.clone())
            .collect();
        for name in &old_names {
            self.scheduler.cancel(name);
        }
        self.state = incoming;
        self.version = row.version;
        for record in &self.state.snoozed_notifications {
            self.scheduler.register(&record.timer_name, record.wake_at_ms);
        }
        self.touch_badge();
        Ok(true)
    }

    /// Rebuild wake timers after process start: records whose deadline
    /// passed while nothing was running wake immediately, the rest are
    /// re-armed.
    pub fn reconcile_on_startup(&mut self) {
        let now = now_ms();
        let mut due_now = Vec::new();
        for record in &self.state.snoozed_notifications {
            if record.wake_at_ms <= now {
                due_now.push(record.notification_id().to_string());
            } else {
                self.scheduler.register(&record.timer_name, record.wake_at_ms);
            }
        }
        for id in due_now {
            self.wake(&id);
        }
    }

    /// Drain buffered events.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
