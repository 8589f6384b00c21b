//! Auto-archive rule engine.
//!
//! Lets users define rules that sweep matching notifications out of the
//! active bucket into the archive.

pub mod engine;
pub mod rule;

pub use engine::{apply_rules, matches_rule, DataAnomaly, RuleOutcome};
pub use rule::{ArchiveRule, RuleCondition};
