//! Achievement evaluation over derived stats.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::catalog::{self, AchievementDefinition, ManualTrigger, Rule, CATALOG};

/// Derived values the predicate rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressStats {
    pub streak: u32,
    pub level: u64,
    pub total_completed: u64,
    pub setup_complete: bool,
}

/// Whether `rule` holds for `stats`. Manual rules never hold here.
pub fn rule_satisfied(rule: &Rule, stats: &ProgressStats) -> bool {
    match *rule {
        Rule::StreakThreshold(n) => stats.streak >= n,
        Rule::LevelThreshold(n) => stats.level >= n,
        Rule::LifetimeCountThreshold(n) => stats.total_completed >= n,
        Rule::SetupComplete => stats.setup_complete,
        Rule::Manual(_) => false,
    }
}

/// One catalog entry as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementView {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
    pub hidden: bool,
}

/// Owns the unlocked set. Ids are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementEngine {
    unlocked: BTreeSet<String>,
}

impl AchievementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids not in the catalog are kept as-is.
    pub fn hydrate<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unlocked: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn unlocked(&self) -> &BTreeSet<String> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Scan locked entries and unlock every predicate rule that now holds.
    pub fn evaluate(&mut self, stats: &ProgressStats) -> Vec<&'static AchievementDefinition> {
        let newly: Vec<_> = CATALOG
            .iter()
            .filter(|a| !self.unlocked.contains(a.id))
            .filter(|a| rule_satisfied(&a.rule, stats))
            .collect();
        for a in &newly {
            self.insert(a);
        }
        newly
    }

    /// Unlock the achievement bound to `trigger`. Returns it only when it
    /// was locked before.
    pub fn trigger(&mut self, trigger: ManualTrigger) -> Option<&'static AchievementDefinition> {
        let achievement = catalog::for_trigger(trigger)?;
        if self.unlocked.contains(achievement.id) {
            return None;
        }
        self.insert(achievement);
        Some(achievement)
    }

    /// Catalog entries in order, masked where hidden and locked.
    pub fn views(&self) -> Vec<AchievementView> {
        CATALOG
            .iter()
            .map(|a| {
                let unlocked = self.is_unlocked(a.id);
                AchievementView {
                    id: a.id,
                    name: a.display_name(unlocked),
                    description: a.display_description(unlocked),
                    unlocked,
                    hidden: a.hidden,
                }
            })
            .collect()
    }

    fn insert(&mut self, achievement: &AchievementDefinition) {
        self.unlocked.insert(achievement.id.to_string());
        tracing::info!(id = achievement.id, name = achievement.name, "achievement unlocked");
    }
}
