use std::collections::BTreeSet;

use clap::Subcommand;
use notibox_core::model::NotificationReason;
use notibox_core::rules::ArchiveRule;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum RulesAction {
    /// Add an auto-archive rule
    Add {
        /// Rule kind (repo, age, reason)
        kind: String,
        /// owner/repo for repo, days for age, comma-separated reasons
        value: String,
    },
    /// List configured rules
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enable or disable a rule
    Toggle {
        /// Rule id
        id: Uuid,
    },
    /// Delete a rule
    Delete {
        /// Rule id
        id: Uuid,
    },
    /// Run the rules over the active bucket
    Apply {
        /// Preview without archiving
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(action: RulesAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = super::open_store()?;

    match action {
        RulesAction::Add { kind, value } => {
            let rule = build_rule(&kind, &value)?;
            println!("Rule added: {} ({})", rule.id, rule.describe());
            store.add_rule(rule);
            store.flush()?;
        }
        RulesAction::List { json } => {
            let rules = store.rules();
            if json {
                println!("{}", serde_json::to_string_pretty(rules)?);
            } else if rules.is_empty() {
                println!("No rules configured.");
            } else {
                for rule in rules {
                    println!(
                        "{}  [{}] {} (archived {})",
                        rule.id,
                        if rule.enabled { "on" } else { "off" },
                        rule.describe(),
                        rule.archived_count,
                    );
                }
            }
        }
        RulesAction::Toggle { id } => match store.toggle_rule(id) {
            Some(enabled) => {
                store.flush()?;
                println!(
                    "Rule {} {}.",
                    id,
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            None => return Err(format!("no rule with id {id}").into()),
        },
        RulesAction::Delete { id } => {
            if !store.delete_rule(id) {
                return Err(format!("no rule with id {id}").into());
            }
            store.flush()?;
            println!("Rule {id} deleted.");
        }
        RulesAction::Apply { dry_run } => {
            let report = if dry_run {
                store.preview_auto_archive()
            } else {
                let report = store.apply_auto_archive_rules();
                store.flush()?;
                report
            };

            let verb = if dry_run { "Would archive" } else { "Archived" };
            println!("{} {} notification(s).", verb, report.archived.len());
            for (rule_id, ids) in &report.rule_matches {
                for id in ids {
                    println!("  {id} (rule {rule_id})");
                }
            }
            for anomaly in &report.anomalies {
                eprintln!(
                    "warning: {} has malformed {}: {:?}",
                    anomaly.notification_id, anomaly.field, anomaly.value
                );
            }
        }
    }

    Ok(())
}

fn build_rule(kind: &str, value: &str) -> Result<ArchiveRule, Box<dyn std::error::Error>> {
    match kind {
        "repo" => Ok(ArchiveRule::repository(value)?),
        "age" => Ok(ArchiveRule::max_age(value.parse()?)),
        "reason" => {
            let reasons = value
                .split(',')
                .map(|s| {
                    let s = s.trim();
                    NotificationReason::parse(s).ok_or_else(|| format!("unknown reason: {s}"))
                })
                .collect::<Result<BTreeSet<_>, _>>()?;
            Ok(ArchiveRule::reasons(reasons)?)
        }
        _ => Err(format!("Unknown rule kind: {kind}. Valid kinds: repo, age, reason").into()),
    }
}
