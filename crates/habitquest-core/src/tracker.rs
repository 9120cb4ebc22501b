//! Daily completion tracking.
//!
//! Owns today's completed habit slots, the per-day history of completion
//! counts, and the lifetime completion counter. History is only written
//! through today's toggles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ValidationError};
use crate::setup::{HABITS_PER_GOAL, SELECTED_GOAL_COUNT};
use crate::streak::CompletionHistory;

/// One habit slot: `(goal_index, habit_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompletionKey {
    pub goal_index: usize,
    pub habit_index: usize,
}

impl CompletionKey {
    pub fn new(goal_index: usize, habit_index: usize) -> Self {
        Self {
            goal_index,
            habit_index,
        }
    }

    /// Reject keys that do not name a habit slot.
    pub fn validate(&self) -> Result<()> {
        if self.goal_index >= SELECTED_GOAL_COUNT {
            return Err(ValidationError::OutOfBounds {
                collection: "goalIndex".into(),
                index: self.goal_index,
                len: SELECTED_GOAL_COUNT,
            }
            .into());
        }
        if self.habit_index >= HABITS_PER_GOAL {
            return Err(ValidationError::OutOfBounds {
                collection: "habitIndex".into(),
                index: self.habit_index,
                len: HABITS_PER_GOAL,
            }
            .into());
        }
        Ok(())
    }
}

/// Persisted as `"goalIndex-habitIndex"`.
impl fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.goal_index, self.habit_index)
    }
}

impl FromStr for CompletionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidValue {
            field: "completionKey".into(),
            message: format!("expected 'goal-habit', got '{s}'"),
        };
        let (goal, habit) = s.split_once('-').ok_or_else(invalid)?;
        let goal_index = goal.trim().parse().map_err(|_| invalid())?;
        let habit_index = habit.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(goal_index, habit_index))
    }
}

impl Serialize for CompletionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompletionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Result of a single toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub key: CompletionKey,
    /// State after the flip.
    pub completed: bool,
    /// `|today|` after the flip, also written to history.
    pub completed_today: u32,
    pub total_completed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTracker {
    today: BTreeSet<CompletionKey>,
    history: CompletionHistory,
    total_completed: u64,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hydrate(
        today: BTreeSet<CompletionKey>,
        history: CompletionHistory,
        total_completed: u64,
    ) -> Self {
        Self {
            today,
            history,
            total_completed,
        }
    }

    pub fn today(&self) -> &BTreeSet<CompletionKey> {
        &self.today
    }

    pub fn history(&self) -> &CompletionHistory {
        &self.history
    }

    pub fn total_completed(&self) -> u64 {
        self.total_completed
    }

    pub fn is_completed(&self, key: &CompletionKey) -> bool {
        self.today.contains(key)
    }

    pub fn count_on(&self, date: NaiveDate) -> u32 {
        self.history.get(&date).copied().unwrap_or(0)
    }

    /// Flip `key` for `today`.
    ///
    /// History for `today` is overwritten with the new cardinality of the
    /// set. The lifetime counter moves by one in the direction of the flip
    /// and never drops below zero.
    pub fn toggle(&mut self, key: CompletionKey, today: NaiveDate) -> Result<Toggle> {
        key.validate()?;
        let completed = if self.today.remove(&key) {
            self.total_completed = self.total_completed.saturating_sub(1);
            false
        } else {
            self.today.insert(key);
            self.total_completed += 1;
            true
        };
        let completed_today = self.today.len() as u32;
        self.history.insert(today, completed_today);
        tracing::debug!(
            key = %key,
            completed,
            completed_today,
            total = self.total_completed,
            "habit toggled"
        );
        Ok(Toggle {
            key,
            completed,
            completed_today,
            total_completed: self.total_completed,
        })
    }

    /// Start a new day. Yesterday's count is already in history.
    pub fn clear_today(&mut self) -> usize {
        let cleared = self.today.len();
        self.today.clear();
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn toggle_on_records_count_and_total() {
        let mut t = CompletionTracker::new();
        let r = t.toggle(CompletionKey::new(0, 1), day()).unwrap();
        assert!(r.completed);
        assert_eq!(t.count_on(day()), 1);
        assert_eq!(t.total_completed(), 1);
    }

    #[test]
    fn history_is_cardinality_not_running_sum() {
        let mut t = CompletionTracker::new();
        t.toggle(CompletionKey::new(0, 0), day()).unwrap();
        t.toggle(CompletionKey::new(1, 0), day()).unwrap();
        t.toggle(CompletionKey::new(0, 0), day()).unwrap();
        assert_eq!(t.count_on(day()), 1);
        assert_eq!(t.total_completed(), 1);
    }

    #[test]
    fn double_toggle_restores_state() {
        let mut t = CompletionTracker::hydrate(BTreeSet::new(), CompletionHistory::new(), 9);
        t.toggle(CompletionKey::new(0, 0), day()).unwrap();
        t.toggle(CompletionKey::new(1, 2), day()).unwrap();
        t.toggle(CompletionKey::new(1, 2), day()).unwrap();
        assert_eq!(t.total_completed(), 10);
        assert_eq!(t.count_on(day()), 1);
    }

    #[test]
    fn uncheck_floors_total_at_zero() {
        let mut today = BTreeSet::new();
        today.insert(CompletionKey::new(0, 0));
        let mut t = CompletionTracker::hydrate(today, CompletionHistory::new(), 0);
        let r = t.toggle(CompletionKey::new(0, 0), day()).unwrap();
        assert!(!r.completed);
        assert_eq!(t.total_completed(), 0);
        assert_eq!(t.count_on(day()), 0);
    }

    #[test]
    fn out_of_range_key_is_rejected() {
        let mut t = CompletionTracker::new();
        assert!(t.toggle(CompletionKey::new(2, 0), day()).is_err());
        assert!(t.toggle(CompletionKey::new(0, 3), day()).is_err());
        assert!(t.history().is_empty());
    }

    #[test]
    fn clear_today_keeps_history() {
        let mut t = CompletionTracker::new();
        t.toggle(CompletionKey::new(0, 0), day()).unwrap();
        assert_eq!(t.clear_today(), 1);
        assert!(t.today().is_empty());
        assert_eq!(t.count_on(day()), 1);
    }

    #[test]
    fn key_text_form() {
        let key: CompletionKey = "1-2".parse().unwrap();
        assert_eq!(key, CompletionKey::new(1, 2));
        assert_eq!(key.to_string(), "1-2");
        assert!("12".parse::<CompletionKey>().is_err());
        assert!("a-b".parse::<CompletionKey>().is_err());
    }
}
