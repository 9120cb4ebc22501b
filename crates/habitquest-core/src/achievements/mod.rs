//! Achievement rule engine.
//!
//! Predicate rules (streak, level, lifetime count, setup) are re-evaluated
//! after every state change; manual rules are unlocked by the handler that
//! observes their event. The unlocked set only grows.

mod catalog;
mod engine;
pub mod triggers;

pub use catalog::{find, for_trigger, AchievementDefinition, ManualTrigger, Rule, CATALOG, MASKED_NAME};
pub use engine::{rule_satisfied, AchievementEngine, AchievementView, ProgressStats};
