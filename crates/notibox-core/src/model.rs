//! Notification data model.
//!
//! The shapes here mirror the remote notification payload, so a fetched
//! item deserializes straight into the store and persists in the same
//! form. `updated_at` stays a raw RFC 3339 string on purpose: a value
//! the remote sends malformed must survive the round trip and only
//! degrade the features that need to parse it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why the remote service delivered a notification.
///
/// Unknown reasons collapse into [`NotificationReason::Other`] rather
/// than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationReason {
    Assign,
    Author,
    Comment,
    CiActivity,
    Invitation,
    Manual,
    Mention,
    ReviewRequested,
    SecurityAlert,
    StateChange,
    Subscribed,
    TeamMention,
    #[serde(other)]
    Other,
}

impl NotificationReason {
    /// Reasons that demand attention directly from the user.
    pub fn is_priority(self) -> bool {
        matches!(
            self,
            NotificationReason::Mention
                | NotificationReason::TeamMention
                | NotificationReason::ReviewRequested
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationReason::Assign => "assign",
            NotificationReason::Author => "author",
            NotificationReason::Comment => "comment",
            NotificationReason::CiActivity => "ci_activity",
            NotificationReason::Invitation => "invitation",
            NotificationReason::Manual => "manual",
            NotificationReason::Mention => "mention",
            NotificationReason::ReviewRequested => "review_requested",
            NotificationReason::SecurityAlert => "security_alert",
            NotificationReason::StateChange => "state_change",
            NotificationReason::Subscribed => "subscribed",
            NotificationReason::TeamMention => "team_mention",
            NotificationReason::Other => "other",
        }
    }

    /// Parses the wire name back into a reason. Used by the CLI when
    /// reading rule arguments; unknown names are rejected rather than
    /// mapped to `Other` so a typo does not silently build a dead rule.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "assign" => Some(NotificationReason::Assign),
            "author" => Some(NotificationReason::Author),
            "comment" => Some(NotificationReason::Comment),
            "ci_activity" => Some(NotificationReason::CiActivity),
            "invitation" => Some(NotificationReason::Invitation),
            "manual" => Some(NotificationReason::Manual),
            "mention" => Some(NotificationReason::Mention),
            "review_requested" => Some(NotificationReason::ReviewRequested),
            "security_alert" => Some(NotificationReason::SecurityAlert),
            "state_change" => Some(NotificationReason::StateChange),
            "subscribed" => Some(NotificationReason::Subscribed),
            "team_mention" => Some(NotificationReason::TeamMention),
            _ => None,
        }
    }
}

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub title: String,
    /// API URL of the subject. Absent for some subject kinds.
    #[serde(default)]
    pub url: Option<String>,
    /// Subject kind as reported by the remote ("Issue", "PullRequest", ...).
    #[serde(rename = "type")]
    pub kind: String,
}

/// The repository a notification belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Canonical `owner/repo` name.
    pub full_name: String,
}

/// One notification as tracked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    /// Remote thread id. Stable across fetches.
    pub id: String,
    pub unread: bool,
    pub reason: NotificationReason,
    pub subject: Subject,
    pub repository: RepoRef,
    /// RFC 3339 timestamp of the last subject update, kept verbatim.
    pub updated_at: String,
    #[serde(default)]
    pub last_read_at: Option<String>,
}

impl NotificationItem {
    /// Parses `updated_at`. `None` when the remote sent a malformed
    /// timestamp; callers decide how to degrade.
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Inbox list filter. Persisted so both execution contexts render the
/// same view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxFilter {
    #[default]
    All,
    Mentions,
    Reviews,
    Assigned,
}

impl InboxFilter {
    /// Whether an item with this reason shows under the filter.
    pub fn admits(self, reason: NotificationReason) -> bool {
        match self {
            InboxFilter::All => true,
            InboxFilter::Mentions => matches!(
                reason,
                NotificationReason::Mention | NotificationReason::TeamMention
            ),
            InboxFilter::Reviews => reason == NotificationReason::ReviewRequested,
            InboxFilter::Assigned => reason == NotificationReason::Assign,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InboxFilter::All => "all",
            InboxFilter::Mentions => "mentions",
            InboxFilter::Reviews => "reviews",
            InboxFilter::Assigned => "assigned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(InboxFilter::All),
            "mentions" => Some(InboxFilter::Mentions),
            "reviews" => Some(InboxFilter::Reviews),
            "assigned" => Some(InboxFilter::Assigned),
            _ => None,
        }
    }
}

/// Per-filter item counts over the active bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCounts {
    pub all: usize,
    pub mentions: usize,
    pub reviews: usize,
    pub assigned: usize,
}

impl FilterCounts {
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a NotificationItem>) -> Self {
        let mut counts = FilterCounts::default();
        for item in items {
            counts.all += 1;
            if InboxFilter::Mentions.admits(item.reason) {
                counts.mentions += 1;
            }
            if InboxFilter::Reviews.admits(item.reason) {
                counts.reviews += 1;
            }
            if InboxFilter::Assigned.admits(item.reason) {
                counts.assigned += 1;
            }
        }
        counts
    }
}
