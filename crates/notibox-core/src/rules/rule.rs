//! Rule definitions.
//!
//! Rules are built through validating factories only, so a rule that
//! exists is a rule that is well-formed. Evaluation lives in
//! [`crate::rules::engine`]; nothing here mutates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::model::NotificationReason;

/// Condition payload, one variant per rule kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Matches notifications from exactly one repository.
    Repository { full_name: String },
    /// Matches notifications strictly older than `days` days.
    MaxAge { days: u32 },
    /// Matches notifications whose reason is in the set.
    Reason { reasons: BTreeSet<NotificationReason> },
}

/// A user-defined auto-archive rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRule {
    pub id: Uuid,
    /// Disabled rules never match but keep their statistics.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    /// Lifetime count of notifications this rule archived. Never
    /// decremented; toggling the rule leaves it intact.
    #[serde(default)]
    pub archived_count: u64,
    pub condition: RuleCondition,
}

fn default_enabled() -> bool {
    true
}

impl ArchiveRule {
    fn with_condition(condition: RuleCondition) -> Self {
        Self {
            id: Uuid::new_v4(),
            enabled: true,
            created_at: Utc::now(),
            archived_count: 0,
            condition,
        }
    }

    /// Builds a repository rule. The name must be `owner/repo`.
    pub fn repository(full_name: &str) -> Result<Self, ValidationError> {
        if !is_valid_repo_name(full_name) {
            return Err(ValidationError::InvalidRepositoryName {
                value: full_name.to_string(),
            });
        }
        Ok(Self::with_condition(RuleCondition::Repository {
            full_name: full_name.to_string(),
        }))
    }

    /// Builds an age rule matching items older than `days` days.
    pub fn max_age(days: u32) -> Self {
        Self::with_condition(RuleCondition::MaxAge { days })
    }

    /// Builds a reason rule. The set must not be empty.
    pub fn reasons(reasons: BTreeSet<NotificationReason>) -> Result<Self, ValidationError> {
        if reasons.is_empty() {
            return Err(ValidationError::EmptyReasonSet);
        }
        Ok(Self::with_condition(RuleCondition::Reason { reasons }))
    }

    /// Human-readable description of the condition for listings.
    pub fn describe(&self) -> String {
        match &self.condition {
            RuleCondition::Repository { full_name } => {
                format!("repository is {full_name}")
            }
            RuleCondition::MaxAge { days } => {
                format!("older than {days} day{}", if *days == 1 { "" } else { "s" })
            }
            RuleCondition::Reason { reasons } => {
                let names: Vec<&str> = reasons.iter().map(|r| r.as_str()).collect();
                format!("reason in [{}]", names.join(", "))
            }
        }
    }
}

fn is_valid_repo_name(name: &str) -> bool {
    let mut parts = name.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) => {
            !owner.is_empty()
                && !repo.is_empty()
                && !owner.contains(char::is_whitespace)
                && !repo.contains(char::is_whitespace)
        }
        _ => false,
    }
}
