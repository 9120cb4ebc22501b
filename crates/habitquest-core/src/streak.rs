//! Consecutive-day streak over the completion history.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// Per-day completion counts keyed by local calendar date.
pub type CompletionHistory = BTreeMap<NaiveDate, u32>;

/// Count consecutive days ending at `today` whose recorded count is above
/// zero. A missing or zero `today` yields 0.
pub fn current_streak(history: &CompletionHistory, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(today);
    while let Some(d) = day {
        match history.get(&d) {
            Some(&count) if count > 0 => {
                streak += 1;
                day = d.checked_sub_days(Days::new(1));
            }
            _ => break,
        }
    }
    streak
}

/// First day of the streak ending at `today`, if there is one.
pub fn streak_start(history: &CompletionHistory, today: NaiveDate) -> Option<NaiveDate> {
    let streak = current_streak(history, today);
    if streak == 0 {
        return None;
    }
    today.checked_sub_days(Days::new(u64::from(streak) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn history(entries: &[(&str, u32)]) -> CompletionHistory {
        entries.iter().map(|(d, c)| (date(d), *c)).collect()
    }

    #[test]
    fn counts_consecutive_days_ending_today() {
        let h = history(&[("2024-01-01", 2), ("2024-01-02", 3)]);
        assert_eq!(current_streak(&h, date("2024-01-02")), 2);
    }

    #[test]
    fn absent_today_breaks_streak() {
        let h = history(&[("2024-01-01", 2), ("2024-01-02", 3)]);
        assert_eq!(current_streak(&h, date("2024-01-03")), 0);
    }

    #[test]
    fn zero_count_day_breaks_streak() {
        let h = history(&[("2024-01-01", 2), ("2024-01-02", 0), ("2024-01-03", 1)]);
        assert_eq!(current_streak(&h, date("2024-01-03")), 1);
    }

    #[test]
    fn streak_crosses_month_and_year_boundaries() {
        let h = history(&[("2023-12-31", 1), ("2024-01-01", 1), ("2024-01-02", 1)]);
        assert_eq!(current_streak(&h, date("2024-01-02")), 3);
    }

    #[test]
    fn start_of_streak() {
        let h = history(&[("2024-03-01", 1), ("2024-03-02", 1), ("2024-03-03", 4)]);
        assert_eq!(streak_start(&h, date("2024-03-03")), Some(date("2024-03-01")));
        assert_eq!(streak_start(&h, date("2024-03-05")), None);
    }
}
