//! The persisted inbox state.
//!
//! Exactly the durable fields and nothing else: loading flags, error
//! text, and the selection set are session state and are deliberately
//! absent. Every field is `#[serde(default)]` so envelopes written by
//! older builds keep loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UndoSnapshot;
use crate::model::{InboxFilter, NotificationItem};
use crate::rules::ArchiveRule;
use crate::snooze::SnoozeRecord;

/// The durable inbox state. One instance per context, serialized as a
/// single JSON envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboxState {
    /// Active bucket: the local mirror of the remote inbox.
    #[serde(default)]
    pub notifications: Vec<NotificationItem>,
    /// Archived bucket. Terminal; survives refetches.
    #[serde(default)]
    pub archived_notifications: Vec<NotificationItem>,
    /// Snoozed bucket with wake bookkeeping.
    #[serde(default)]
    pub snoozed_notifications: Vec<SnoozeRecord>,
    #[serde(default)]
    pub auto_archive_rules: Vec<ArchiveRule>,
    #[serde(default)]
    pub active_filter: InboxFilter,
    #[serde(default)]
    pub last_fetched: Option<DateTime<Utc>>,
    /// Last bulk mark-as-read snapshot, so undo works from a later
    /// invocation too.
    #[serde(default)]
    pub undo_slot: Option<UndoSnapshot>,
}

impl InboxState {
    pub fn is_archived(&self, id: &str) -> bool {
        self.archived_notifications.iter().any(|n| n.id == id)
    }

    pub fn is_snoozed(&self, id: &str) -> bool {
        self.snoozed_notifications
            .iter()
            .any(|r| r.notification_id() == id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.notifications.iter().any(|n| n.id == id)
    }
}
