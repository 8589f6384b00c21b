//! Snooze records and wake scheduling.
//!
//! The platform timer facility sits behind the [`WakeScheduler`] trait
//! (register / cancel / due) so the engine stays portable and testable.
//! [`TimerWheel`] is the built-in implementation: a map of named
//! deadlines with no internal threads. The owner drives it by calling
//! `due()` from its tick loop; deadlines already in the past fire on
//! the next call, which is also how wakes missed while no process was
//! running catch up.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::NotificationItem;

/// Bookkeeping for one snoozed notification. Exactly one record exists
/// per snoozed id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnoozeRecord {
    /// The item as it looked when snoozed; restored on wake.
    pub notification: NotificationItem,
    pub snoozed_at: DateTime<Utc>,
    /// Wake deadline in epoch milliseconds.
    pub wake_at_ms: i64,
    /// Scheduler timer name for this record.
    pub timer_name: String,
}

impl SnoozeRecord {
    pub fn new(notification: NotificationItem, snoozed_at: DateTime<Utc>, wake_at_ms: i64) -> Self {
        let timer_name = timer_name_for(&notification.id);
        Self {
            notification,
            snoozed_at,
            wake_at_ms,
            timer_name,
        }
    }

    pub fn notification_id(&self) -> &str {
        &self.notification.id
    }
}

/// Timer name for a notification's wake deadline.
pub fn timer_name_for(id: &str) -> String {
    format!("snooze-{id}")
}

/// Named one-shot wake timers.
pub trait WakeScheduler: Send {
    /// Registers a timer. Re-registering an existing name replaces its
    /// deadline. A deadline in the past fires on the next `due()`.
    fn register(&mut self, name: &str, fire_at_ms: i64);

    /// Cancels a timer. Unknown names are a no-op.
    fn cancel(&mut self, name: &str);

    /// Removes and returns the names whose deadline has elapsed.
    fn due(&mut self, now_ms: i64) -> Vec<String>;

    /// Number of armed timers.
    fn pending(&self) -> usize;
}

/// In-memory [`WakeScheduler`] driven entirely by `due()` calls.
#[derive(Debug, Default)]
pub struct TimerWheel {
    deadlines: HashMap<String, i64>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WakeScheduler for TimerWheel {
    fn register(&mut self, name: &str, fire_at_ms: i64) {
        self.deadlines.insert(name.to_string(), fire_at_ms);
    }

    fn cancel(&mut self, name: &str) {
        self.deadlines.remove(name);
    }

    fn due(&mut self, now_ms: i64) -> Vec<String> {
        let mut fired: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, &fire_at)| fire_at <= now_ms)
            .map(|(name, _)| name.clone())
            .collect();
        // Deterministic firing order.
        fired.sort_unstable();
        for name in &fired {
            self.deadlines.remove(name);
        }
        fired
    }

    fn pending(&self) -> usize {
        self.deadlines.len()
    }
}
