//! Durable document form of a user's state.
//!
//! Field names match the stored document (camelCase). Loading is tolerant:
//! missing fields fall back to defaults, malformed dates and completion keys
//! are skipped with a warning, negative counters are clamped to zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::achievements::AchievementEngine;
use crate::dashboard::Dashboard;
use crate::setup::{GoalSet, HabitPlan, HabitSlots, SetupMachine, Stage, SELECTED_GOAL_COUNT};
use crate::streak::CompletionHistory;
use crate::tracker::{CompletionKey, CompletionTracker};
use crate::DATE_FORMAT;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub goals: Vec<String>,
    pub selected_goals: Vec<String>,
    /// Keyed by selected-goal index as a string ("0", "1").
    pub habits: BTreeMap<String, Vec<String>>,
    pub current_section: Stage,
    pub completion_history: BTreeMap<String, i64>,
    pub total_habits_completed_ever: i64,
    pub unlocked_achievements: Vec<String>,
    /// Only the entry for the current day is read back.
    pub todays_completed_habits: BTreeMap<String, Vec<String>>,
}

/// Partial write. Absent fields are left untouched by a merge upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habits: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_section: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_history: Option<BTreeMap<String, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_habits_completed_ever: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_achievements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todays_completed_habits: Option<BTreeMap<String, Vec<String>>>,
}

impl From<Snapshot> for SnapshotPatch {
    fn from(s: Snapshot) -> Self {
        Self {
            goals: Some(s.goals),
            selected_goals: Some(s.selected_goals),
            habits: Some(s.habits),
            current_section: Some(s.current_section),
            completion_history: Some(s.completion_history),
            total_habits_completed_ever: Some(s.total_habits_completed_ever),
            unlocked_achievements: Some(s.unlocked_achievements),
            todays_completed_habits: Some(s.todays_completed_habits),
        }
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn padded<const N: usize>(items: &[String]) -> [String; N] {
    std::array::from_fn(|i| items.get(i).cloned().unwrap_or_default())
}

impl Snapshot {
    /// Capture the full state; today's set is stored under `today`.
    pub fn capture(dashboard: &Dashboard, today: NaiveDate) -> Self {
        let setup = dashboard.setup();
        let tracker = dashboard.tracker();
        Self {
            goals: setup.goals().to_vec(),
            selected_goals: setup.selected_goals().to_vec(),
            habits: setup
                .habits()
                .iter()
                .enumerate()
                .map(|(i, slots)| (i.to_string(), slots.to_vec()))
                .collect(),
            current_section: setup.stage(),
            completion_history: tracker
                .history()
                .iter()
                .map(|(&date, &count)| (date_key(date), i64::from(count)))
                .collect(),
            total_habits_completed_ever: i64::try_from(tracker.total_completed()).unwrap_or(i64::MAX),
            unlocked_achievements: dashboard.achievements().unlocked().iter().cloned().collect(),
            todays_completed_habits: BTreeMap::from([(
                date_key(today),
                tracker.today().iter().map(ToString::to_string).collect(),
            )]),
        }
    }

    /// Rebuild engine state. The stage is inferred from the data, not read
    /// from `currentSection`.
    pub fn hydrate(&self, today: NaiveDate) -> Dashboard {
        let goals: GoalSet = padded(&self.goals);
        let habits: HabitPlan = std::array::from_fn(|i| {
            let slots: HabitSlots = self
                .habits
                .get(&i.to_string())
                .map(|list| padded(list))
                .unwrap_or_default();
            slots
        });
        let mut selected = self.selected_goals.clone();
        selected.truncate(SELECTED_GOAL_COUNT);
        let setup = SetupMachine::hydrate(goals, selected, habits);

        let tracker = CompletionTracker::hydrate(
            self.today_set(today),
            self.history(),
            u64::try_from(self.total_habits_completed_ever).unwrap_or(0),
        );
        let achievements = AchievementEngine::hydrate(self.unlocked_achievements.iter().cloned());
        Dashboard::from_parts(setup, tracker, achievements)
    }

    fn history(&self) -> CompletionHistory {
        self.completion_history
            .iter()
            .filter_map(|(raw, &count)| match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) => Some((date, u32::try_from(count.max(0)).unwrap_or(u32::MAX))),
                Err(_) => {
                    tracing::warn!(date = %raw, "skipping malformed history date");
                    None
                }
            })
            .collect()
    }

    fn today_set(&self, today: NaiveDate) -> BTreeSet<CompletionKey> {
        let Some(keys) = self.todays_completed_habits.get(&date_key(today)) else {
            return BTreeSet::new();
        };
        keys.iter()
            .filter_map(|raw| match raw.parse::<CompletionKey>() {
                Ok(key) if key.validate().is_ok() => Some(key),
                _ => {
                    tracing::warn!(key = %raw, "skipping malformed completion key");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn stored() -> serde_json::Value {
        json!({
            "goals": ["Run", "Read", "Code", "Cook", "Save"],
            "selectedGoals": ["Run", "Code"],
            "habits": { "0": ["jog", "stretch", "hydrate"], "1": ["kata", "review", "ship"] },
            "currentSection": "dashboard",
            "completionHistory": { "2024-02-01": 3, "2024-02-02": 2, "bogus": 1 },
            "totalHabitsCompletedEver": 5,
            "unlockedAchievements": ["streak1", "firstGoal"],
            "todaysCompletedHabits": {
                "2024-02-01": ["0-0"],
                "2024-02-02": ["0-1", "1-2", "9-9", "x"]
            }
        })
    }

    #[test]
    fn hydrate_full_document() {
        let snap: Snapshot = serde_json::from_value(stored()).unwrap();
        let d = snap.hydrate(date("2024-02-02"));
        assert_eq!(d.stage(), Stage::Dashboard);
        assert_eq!(d.setup().selected_goals(), ["Run", "Code"]);
        assert_eq!(d.setup().habits()[1][2], "ship");
        assert_eq!(d.tracker().history().len(), 2);
        assert_eq!(d.tracker().total_completed(), 5);
        assert_eq!(d.tracker().today().len(), 2);
        assert!(d.achievements().is_unlocked("firstGoal"));
        assert_eq!(d.streak(date("2024-02-02")), 2);
    }

    #[test]
    fn stale_today_entry_is_ignored() {
        let snap: Snapshot = serde_json::from_value(stored()).unwrap();
        let d = snap.hydrate(date("2024-02-03"));
        assert!(d.tracker().today().is_empty());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let snap: Snapshot = serde_json::from_value(json!({ "goals": ["A"] })).unwrap();
        let d = snap.hydrate(date("2024-02-02"));
        assert_eq!(d.stage(), Stage::Select);
        assert_eq!(d.setup().goals()[0], "A");
        assert_eq!(d.setup().goals()[4], "");
        assert_eq!(d.tracker().total_completed(), 0);
    }

    #[test]
    fn negative_counters_are_clamped() {
        let snap: Snapshot = serde_json::from_value(json!({
            "totalHabitsCompletedEver": -4,
            "completionHistory": { "2024-02-02": -1 }
        }))
        .unwrap();
        let d = snap.hydrate(date("2024-02-02"));
        assert_eq!(d.tracker().total_completed(), 0);
        assert_eq!(d.tracker().count_on(date("2024-02-02")), 0);
    }

    #[test]
    fn capture_uses_document_field_names() {
        let snap: Snapshot = serde_json::from_value(stored()).unwrap();
        let d = snap.hydrate(date("2024-02-02"));
        let value = serde_json::to_value(Snapshot::capture(&d, date("2024-02-02"))).unwrap();
        assert_eq!(value["currentSection"], "dashboard");
        assert_eq!(value["habits"]["0"][1], "stretch");
        assert_eq!(value["todaysCompletedHabits"]["2024-02-02"], json!(["0-1", "1-2"]));
        assert_eq!(value["completionHistory"]["2024-02-01"], 3);
        assert_eq!(value["totalHabitsCompletedEver"], 5);
    }

    #[test]
    fn patch_omits_absent_fields() {
        let patch = SnapshotPatch {
            total_habits_completed_ever: Some(3),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "totalHabitsCompletedEver": 3 }));
    }
}
