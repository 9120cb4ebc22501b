//! Read-only activity summaries built from the completion history.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::setup::{HABITS_PER_GOAL, SELECTED_GOAL_COUNT};
use crate::streak::CompletionHistory;

/// Entries in the recent activity log.
pub const RECENT_ACTIVITY_LEN: usize = 5;
/// Weeks in the activity heatmap.
pub const HEATMAP_WEEKS: u64 = 5;
/// Denominator for heatmap percentages: every habit slot.
pub const MAX_DAILY_COMPLETIONS: usize = SELECTED_GOAL_COUNT * HABITS_PER_GOAL;

/// Rounded percentage, 0 when `total` is 0.
pub fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub date: NaiveDate,
    pub count: u32,
}

/// Most recent days with at least one completion, newest first.
pub fn recent_activity(history: &CompletionHistory) -> Vec<ActivityEntry> {
    history
        .iter()
        .rev()
        .filter(|(_, &count)| count > 0)
        .take(RECENT_ACTIVITY_LEN)
        .map(|(&date, &count)| ActivityEntry { date, count })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
    Full,
}

impl Intensity {
    pub fn from_percent(pct: u32) -> Self {
        match pct {
            0 => Intensity::None,
            1..=33 => Intensity::Low,
            34..=66 => Intensity::Medium,
            67..=99 => Intensity::High,
            _ => Intensity::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u32,
    pub percent: u32,
    pub intensity: Intensity,
    pub is_today: bool,
    pub is_future: bool,
}

/// Five Monday-aligned weeks of cells, the last one containing `today`.
///
/// Percentages are measured against every habit slot and capped at 100.
pub fn heatmap(history: &CompletionHistory, today: NaiveDate) -> Vec<HeatmapCell> {
    let this_monday = today
        .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
        .unwrap_or(today);
    let start = this_monday
        .checked_sub_days(Days::new((HEATMAP_WEEKS - 1) * 7))
        .unwrap_or(this_monday);

    start
        .iter_days()
        .take((HEATMAP_WEEKS * 7) as usize)
        .map(|date| {
            let count = history.get(&date).copied().unwrap_or(0);
            let pct = percent(count as usize, MAX_DAILY_COMPLETIONS).min(100);
            HeatmapCell {
                date,
                count,
                percent: pct,
                intensity: Intensity::from_percent(pct),
                is_today: date == today,
                is_future: date > today,
            }
        })
        .collect()
}

/// Today's completion share for one selected goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_index: usize,
    pub goal: String,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}
