//! Command implementations for the notibox CLI.

pub mod archive;
pub mod auth;
pub mod config;
pub mod inbox;
pub mod read;
pub mod rules;
pub mod snooze;
pub mod status;
pub mod watch;

use notibox_core::storage::{Config, StateDb};
use notibox_core::NotificationStore;

/// Open the store over the default database, with debounce windows
/// taken from config.
pub fn open_store() -> Result<NotificationStore, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = StateDb::open()?;
    let mut store = NotificationStore::open(db)?;
    store.set_debounce_windows(config.store.write_debounce_ms, config.store.badge_debounce_ms);
    Ok(store)
}
