//! Badge projection.
//!
//! The badge is a pure derivation of the active bucket: no stored
//! counter to drift out of sync. Count covers unread actives only;
//! snoozed and archived items never participate.

use serde::{Deserialize, Serialize};

use crate::model::NotificationItem;

/// Largest count rendered as a number; anything above shows "99+".
const DISPLAY_CAP: usize = 99;

/// The projected badge value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Number of unread notifications in the active bucket.
    pub count: usize,
    /// True when at least one unread active has a priority reason.
    pub priority: bool,
}

/// Projects the badge from the active bucket.
pub fn project_badge(active: &[NotificationItem]) -> Badge {
    let mut badge = Badge::default();
    for item in active.iter().filter(|n| n.unread) {
        badge.count += 1;
        if item.reason.is_priority() {
            badge.priority = true;
        }
    }
    badge
}

/// Formats the badge count for display: zero renders empty, 1-99 as a
/// decimal, and anything larger capped at "99+".
pub fn format_badge_count(count: usize) -> String {
    if count == 0 {
        String::new()
    } else if count > DISPLAY_CAP {
        format!("{DISPLAY_CAP}+")
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NotificationReason, RepoRef, Subject};

    fn item(id: &str, unread: bool, reason: NotificationReason) -> NotificationItem {
        NotificationItem {
            id: id.to_string(),
            unread,
            reason,
            subject: Subject {
                title: "t".to_string(),
                url: None,
                kind: "Issue".to_string(),
            },
            repository: RepoRef {
                full_name: "octo/repo".to_string(),
            },
            updated_at: "2025-06-01T10:00:00Z".to_string(),
            last_read_at: None,
        }
    }

    #[test]
    fn counts_unread_only() {
        let active = vec![
            item("n1", true, NotificationReason::Subscribed),
            item("n2", false, NotificationReason::Subscribed),
            item("n3", true, NotificationReason::Comment),
        ];
        let badge = project_badge(&active);
        assert_eq!(badge.count, 2);
        assert!(!badge.priority);
    }

    #[test]
    fn priority_flag_requires_unread_priority_reason() {
        // A read mention must not raise the flag.
        let active = vec![
            item("n1", false, NotificationReason::Mention),
            item("n2", true, NotificationReason::Subscribed),
        ];
        assert!(!project_badge(&active).priority);

        let active = vec![
            item("n1", true, NotificationReason::TeamMention),
            item("n2", true, NotificationReason::Subscribed),
        ];
        assert!(project_badge(&active).priority);
    }

    #[test]
    fn empty_bucket_projects_default() {
        assert_eq!(project_badge(&[]), Badge::default());
    }

    #[test]
    fn count_formatting_boundaries() {
        assert_eq!(format_badge_count(0), "");
        assert_eq!(format_badge_count(1), "1");
        assert_eq!(format_badge_count(99), "99");
        assert_eq!(format_badge_count(100), "99+");
        assert_eq!(format_badge_count(1234), "99+");
    }
}
