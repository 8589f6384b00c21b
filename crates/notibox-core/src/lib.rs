//! # Notibox Core Library
//!
//! This library provides the core engine for Notibox, a local mirror of
//! a remote notification inbox with user-defined automation. It
//! implements a CLI-first philosophy: every operation is available
//! through a standalone CLI binary, and any GUI would be a thin layer
//! over the same store.
//!
//! ## Architecture
//!
//! - **Notification Store**: single source of truth for the three
//!   notification buckets (active, snoozed, archived), with debounced
//!   versioned writes shared by the interactive and watch contexts
//! - **Rule Engine**: pure evaluation of user-defined auto-archive
//!   rules over the active bucket
//! - **Snooze Scheduling**: named wake timers behind a trait, driven by
//!   the owner's tick loop
//! - **Badge**: pure projection of the unread active count
//! - **Remote**: the GitHub notifications API behind the
//!   [`RemoteInbox`] trait
//!
//! ## Key Components
//!
//! - [`NotificationStore`]: bucket state machine and durability
//! - [`ArchiveRule`]: validated auto-archive rules
//! - [`WakeScheduler`]: timer seam for snooze wakes
//! - [`Config`]: application configuration management

pub mod badge;
pub mod error;
pub mod events;
pub mod model;
pub mod remote;
pub mod rules;
pub mod snooze;
pub mod storage;
pub mod store;

pub use badge::{format_badge_count, project_badge, Badge};
pub use error::{ConfigError, CoreError, PersistenceError, RemoteError, ValidationError};
pub use events::Event;
pub use model::{FilterCounts, InboxFilter, NotificationItem, NotificationReason};
pub use remote::{GitHubRemote, RemoteInbox};
pub use rules::{apply_rules, matches_rule, ArchiveRule, DataAnomaly, RuleCondition, RuleOutcome};
pub use snooze::{SnoozeRecord, TimerWheel, WakeScheduler};
pub use storage::{data_dir, Config, StateDb};
pub use store::{now_ms, ApplyReport, NotificationStore};
