//! Event detectors for the manual achievements a completion can unlock.
//!
//! Called from the toggle handler after a habit becomes completed. Each
//! detector is a pure function of the local time of the toggle, today's
//! completion set and the history.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike, Weekday};
use std::collections::BTreeSet;

use super::catalog::ManualTrigger;
use crate::streak::{current_streak, streak_start, CompletionHistory};
use crate::tracker::CompletionKey;

pub const EARLY_BEFORE_HOUR: u32 = 8;
pub const LATE_FROM_HOUR: u32 = 22;
pub const PERFECT_WEEK_DAYS: u64 = 7;
pub const COMEBACK_MIN_STREAK: u32 = 3;

/// What the detectors look at for one completion.
pub struct CompletionContext<'a> {
    pub now: NaiveDateTime,
    pub today: &'a BTreeSet<CompletionKey>,
    pub history: &'a CompletionHistory,
    /// Number of selected goals.
    pub goal_count: usize,
    /// Habits with text across the selected goals.
    pub habit_count: usize,
}

impl CompletionContext<'_> {
    fn date(&self) -> NaiveDate {
        self.now.date()
    }

    fn is_perfect(&self, date: NaiveDate) -> bool {
        self.habit_count > 0
            && self.history.get(&date).copied().unwrap_or(0) as usize >= self.habit_count
    }

    fn days_back(&self, n: u64) -> Option<NaiveDate> {
        self.date().checked_sub_days(Days::new(n))
    }
}

/// Every trigger satisfied by this completion.
pub fn detect(ctx: &CompletionContext<'_>) -> Vec<ManualTrigger> {
    let checks: [(ManualTrigger, fn(&CompletionContext<'_>) -> bool); 6] = [
        (ManualTrigger::EarlyCompletion, early),
        (ManualTrigger::LateCompletion, late),
        (ManualTrigger::HabitDiversity, diverse),
        (ManualTrigger::PerfectWeek, perfect_week),
        (ManualTrigger::PerfectWeekend, perfect_weekend),
        (ManualTrigger::Comeback, comeback),
    ];
    checks
        .into_iter()
        .filter(|(_, check)| check(ctx))
        .map(|(trigger, _)| trigger)
        .collect()
}

fn early(ctx: &CompletionContext<'_>) -> bool {
    ctx.now.hour() < EARLY_BEFORE_HOUR
}

fn late(ctx: &CompletionContext<'_>) -> bool {
    ctx.now.hour() >= LATE_FROM_HOUR
}

fn diverse(ctx: &CompletionContext<'_>) -> bool {
    ctx.goal_count > 1
        && (0..ctx.goal_count).all(|g| ctx.today.iter().any(|k| k.goal_index == g))
}

fn perfect_week(ctx: &CompletionContext<'_>) -> bool {
    (0..PERFECT_WEEK_DAYS).all(|n| ctx.days_back(n).is_some_and(|d| ctx.is_perfect(d)))
}

/// Checked on Sunday, once Saturday is behind.
fn perfect_weekend(ctx: &CompletionContext<'_>) -> bool {
    ctx.date().weekday() == Weekday::Sun
        && ctx.is_perfect(ctx.date())
        && ctx.days_back(1).is_some_and(|sat| ctx.is_perfect(sat))
}

/// A streak of at least three days with activity somewhere before the gap
/// that precedes it.
fn comeback(ctx: &CompletionContext<'_>) -> bool {
    if current_streak(ctx.history, ctx.date()) < COMEBACK_MIN_STREAK {
        return false;
    }
    let Some(start) = streak_start(ctx.history, ctx.date()) else {
        return false;
    };
    ctx.history
        .range(..start)
        .any(|(_, &count)| count > 0)
}
