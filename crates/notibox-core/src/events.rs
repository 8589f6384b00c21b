use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badge::Badge;
use crate::model::NotificationItem;

/// Every committed state change in the store produces an Event.
/// The watch loop emits them for outer consumers; the interactive
/// context drains them after each command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A durable write landed. Carries the written version and the
    /// active bucket so consumers can re-render without reloading.
    StateCommitted {
        version: u64,
        notifications: Vec<NotificationItem>,
        at: DateTime<Utc>,
    },
    /// The badge projection changed (debounced).
    BadgeUpdated {
        badge: Badge,
        at: DateTime<Utc>,
    },
    /// A snoozed notification returned to the active bucket.
    SnoozeWoke {
        id: String,
        at: DateTime<Utc>,
    },
    /// An auto-archive pass archived something.
    RulesApplied {
        archived: usize,
        at: DateTime<Utc>,
    },
    /// A remote push or fetch failed. Local state is unaffected.
    RemoteSyncFailed {
        op: String,
        message: String,
        at: DateTime<Utc>,
    },
}
