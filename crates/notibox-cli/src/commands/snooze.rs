use chrono::DateTime;
use clap::Subcommand;
use notibox_core::now_ms;

#[derive(Subcommand)]
pub enum SnoozeAction {
    /// Snooze an active notification
    Set {
        /// Notification id
        id: String,
        /// Wake time as RFC3339 (e.g. 2026-09-01T09:00:00Z)
        #[arg(long)]
        until: Option<String>,
        /// Wake after this many minutes
        #[arg(long)]
        for_minutes: Option<u64>,
    },
    /// Wake a snoozed notification now
    Cancel {
        /// Notification id
        id: String,
    },
    /// List the snoozed bucket
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SnoozeAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = super::open_store()?;

    match action {
        SnoozeAction::Set {
            id,
            until,
            for_minutes,
        } => {
            let wake_at_ms = match (until, for_minutes) {
                (Some(ts), None) => DateTime::parse_from_rfc3339(&ts)?.timestamp_millis(),
                (None, Some(minutes)) => i64::try_from(minutes)
                    .ok()
                    .and_then(|m| m.checked_mul(60_000))
                    .and_then(|delta| now_ms().checked_add(delta))
                    .ok_or("--for-minutes is too large")?,
                _ => return Err("pass exactly one of --until or --for-minutes".into()),
            };
            if !store.snooze(&id, wake_at_ms) {
                return Err(format!("no active notification with id {id}").into());
            }
            store.flush()?;
            println!("Snoozed {} until {}.", id, format_wake(wake_at_ms));
        }
        SnoozeAction::Cancel { id } => {
            if !store.wake(&id) {
                return Err(format!("{id} is not snoozed").into());
            }
            store.flush()?;
            println!("Woke {id}.");
        }
        SnoozeAction::List { json } => {
            let records = store.snoozed();
            if json {
                println!("{}", serde_json::to_string_pretty(records)?);
            } else if records.is_empty() {
                println!("Nothing snoozed.");
            } else {
                for record in records {
                    println!(
                        "{}  wakes {}  {}",
                        record.notification_id(),
                        format_wake(record.wake_at_ms),
                        record.notification.subject.title,
                    );
                }
            }
        }
    }

    Ok(())
}

fn format_wake(wake_at_ms: i64) -> String {
    match DateTime::from_timestamp_millis(wake_at_ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => format!("{wake_at_ms}ms"),
    }
}
