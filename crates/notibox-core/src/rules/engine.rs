//! Rule evaluation.
//!
//! Evaluation is pure: these functions never touch the store. The store
//! commits the outcome, which is also what makes dry-run previews free.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::model::NotificationItem;
use crate::rules::{ArchiveRule, RuleCondition};

/// A field the engine needed but could not parse. Reported alongside
/// the outcome; never an error, and the item simply does not match.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DataAnomaly {
    pub notification_id: String,
    pub field: &'static str,
    pub value: String,
}

/// Outcome of applying the rule set over the active bucket.
///
/// `to_archive` and `to_keep` partition the input: every evaluated item
/// lands in exactly one of them.
#[derive(Debug, Default)]
pub struct RuleOutcome {
    pub to_archive: Vec<NotificationItem>,
    pub to_keep: Vec<NotificationItem>,
    /// Rule id to the ids it claimed. The first enabled matching rule
    /// in stored order wins, so an id never appears under two rules.
    pub rule_matches: HashMap<Uuid, Vec<String>>,
    pub anomalies: Vec<DataAnomaly>,
}

struct Evaluation {
    matched: bool,
    anomaly: Option<DataAnomaly>,
}

impl Evaluation {
    fn clean(matched: bool) -> Self {
        Self {
            matched,
            anomaly: None,
        }
    }
}

fn evaluate(item: &NotificationItem, rule: &ArchiveRule, now: DateTime<Utc>) -> Evaluation {
    if !rule.enabled {
        return Evaluation::clean(false);
    }
    match &rule.condition {
        RuleCondition::Repository { full_name } => {
            Evaluation::clean(item.repository.full_name == *full_name)
        }
        RuleCondition::MaxAge { days } => match item.updated_at_utc() {
            Some(updated) => {
                // Strictly older: an item exactly `days` old does not match.
                Evaluation::clean(now.signed_duration_since(updated) > Duration::days(*days as i64))
            }
            None => Evaluation {
                matched: false,
                anomaly: Some(DataAnomaly {
                    notification_id: item.id.clone(),
                    field: "updated_at",
                    value: item.updated_at.clone(),
                }),
            },
        },
        RuleCondition::Reason { reasons } => Evaluation::clean(reasons.contains(&item.reason)),
    }
}

/// Whether a single rule matches a single item at `now`.
pub fn matches_rule(item: &NotificationItem, rule: &ArchiveRule, now: DateTime<Utc>) -> bool {
    evaluate(item, rule, now).matched
}

/// Applies the rule set to the given items and partitions them.
pub fn apply_rules(
    items: &[NotificationItem],
    rules: &[ArchiveRule],
    now: DateTime<Utc>,
) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();
    for item in items {
        let mut winner: Option<Uuid> = None;
        for rule in rules {
            let eval = evaluate(item, rule, now);
            if let Some(anomaly) = eval.anomaly {
                if !outcome.anomalies.contains(&anomaly) {
                    outcome.anomalies.push(anomaly);
                }
            }
            if eval.matched {
                winner = Some(rule.id);
                break;
            }
        }
        match winner {
            Some(rule_id) => {
                outcome
                    .rule_matches
                    .entry(rule_id)
                    .or_default()
                    .push(item.id.clone());
                outcome.to_archive.push(item.clone());
            }
            None => outcome.to_keep.push(item.clone()),
        }
    }
    outcome
}
