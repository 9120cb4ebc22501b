//! Progression engine facade.
//!
//! `Dashboard` owns the setup machine, the completion tracker and the
//! achievement engine, and exposes the user actions. After every successful
//! mutation it recomputes streak and level and re-evaluates achievements in
//! the same call, so callers always observe a consistent state.
//!
//! Nothing here touches a clock or a store: dates are passed in and
//! persistence is handled by [`crate::session::Session`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::achievements::triggers::{self, CompletionContext};
use crate::achievements::{
    AchievementDefinition, AchievementEngine, AchievementView, ManualTrigger, ProgressStats,
};
use crate::activity::{self, ActivityEntry, GoalProgress, HeatmapCell};
use crate::error::{Result, ValidationError};
use crate::progression::Progress;
use crate::setup::{HabitPlan, SetupMachine, Stage, HABITS_PER_GOAL};
use crate::streak::{current_streak, CompletionHistory};
use crate::tracker::{CompletionKey, CompletionTracker};

/// Achievements unlocked by one action, in catalog order of discovery.
pub type Unlocked = Vec<&'static AchievementDefinition>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Whether owned state changed (and so needs saving).
    pub changed: bool,
    pub unlocked: Unlocked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub key: CompletionKey,
    pub completed: bool,
    pub completed_today: u32,
    pub total_completed: u64,
    pub unlocked: Unlocked,
}

/// Read-only props for a presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stage: Stage,
    pub level: u64,
    pub experience: u64,
    pub xp_to_next_level: u64,
    pub xp_into_level: u64,
    pub streak: u32,
    pub completion_percentage_today: u32,
    pub completed_today: usize,
    pub habit_count: usize,
    pub total_completed: u64,
    pub goals: Vec<String>,
    pub selected_goals: Vec<String>,
    pub habit_plan: HabitPlan,
    pub today_completion_set: Vec<String>,
    pub completion_history: CompletionHistory,
    pub unlocked_achievements: Vec<String>,
    pub goal_progress: Vec<GoalProgress>,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    setup: SetupMachine,
    tracker: CompletionTracker,
    achievements: AchievementEngine,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        setup: SetupMachine,
        tracker: CompletionTracker,
        achievements: AchievementEngine,
    ) -> Self {
        Self {
            setup,
            tracker,
            achievements,
        }
    }

    /// Default state parked at `Error` after a failed load.
    pub fn failed() -> Self {
        Self {
            setup: SetupMachine::failed(),
            ..Self::default()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> Stage {
        self.setup.stage()
    }

    pub fn setup(&self) -> &SetupMachine {
        &self.setup
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn progress(&self) -> Progress {
        Progress::from_total(self.tracker.total_completed())
    }

    pub fn streak(&self, today: NaiveDate) -> u32 {
        current_streak(self.tracker.history(), today)
    }

    pub fn stats(&self, today: NaiveDate) -> ProgressStats {
        ProgressStats {
            streak: self.streak(today),
            level: self.progress().level,
            total_completed: self.tracker.total_completed(),
            setup_complete: self.setup.is_setup_complete(),
        }
    }

    pub fn completion_percentage_today(&self) -> u32 {
        activity::percent(self.tracker.today().len(), self.setup.defined_habit_count())
    }

    pub fn goal_progress(&self) -> Vec<GoalProgress> {
        self.setup
            .selected_goals()
            .iter()
            .enumerate()
            .map(|(goal_index, goal)| {
                let completed = (0..HABITS_PER_GOAL)
                    .filter(|&h| self.tracker.is_completed(&CompletionKey::new(goal_index, h)))
                    .count();
                let total = self.setup.defined_habits_for(goal_index);
                GoalProgress {
                    goal_index,
                    goal: goal.clone(),
                    completed,
                    total,
                    percent: activity::percent(completed, total),
                }
            })
            .collect()
    }

    pub fn achievement_views(&self) -> Vec<AchievementView> {
        self.achievements.views()
    }

    pub fn heatmap(&self, today: NaiveDate) -> Vec<HeatmapCell> {
        activity::heatmap(self.tracker.history(), today)
    }

    pub fn view(&self, today: NaiveDate) -> DashboardView {
        let progress = self.progress();
        DashboardView {
            stage: self.stage(),
            level: progress.level,
            experience: progress.experience,
            xp_to_next_level: progress.xp_to_next_level,
            xp_into_level: progress.xp_into_level,
            streak: self.streak(today),
            completion_percentage_today: self.completion_percentage_today(),
            completed_today: self.tracker.today().len(),
            habit_count: self.setup.defined_habit_count(),
            total_completed: self.tracker.total_completed(),
            goals: self.setup.goals().to_vec(),
            selected_goals: self.setup.selected_goals().to_vec(),
            habit_plan: self.setup.habits().clone(),
            today_completion_set: self.tracker.today().iter().map(ToString::to_string).collect(),
            completion_history: self.tracker.history().clone(),
            unlocked_achievements: self.achievements.unlocked().iter().cloned().collect(),
            goal_progress: self.goal_progress(),
            recent_activity: activity::recent_activity(self.tracker.history()),
        }
    }

    // ── Recompute pass ───────────────────────────────────────────────

    /// Re-evaluate predicate achievements against freshly derived stats.
    pub fn refresh(&mut self, today: NaiveDate) -> Unlocked {
        let stats = self.stats(today);
        self.achievements.evaluate(&stats)
    }

    fn changed(&mut self, today: NaiveDate, mut unlocked: Unlocked) -> Outcome {
        unlocked.extend(self.refresh(today));
        Outcome {
            changed: true,
            unlocked,
        }
    }

    // ── Onboarding actions ───────────────────────────────────────────

    pub fn set_goal_text(&mut self, index: usize, text: &str, today: NaiveDate) -> Result<Outcome> {
        self.setup.set_goal_text(index, text)?;
        Ok(self.changed(today, Vec::new()))
    }

    pub fn submit_goals(&mut self, today: NaiveDate) -> Result<Outcome> {
        self.setup.submit_goals()?;
        Ok(self.changed(today, Vec::new()))
    }

    pub fn toggle_goal_selection(&mut self, goal: &str, today: NaiveDate) -> Result<Outcome> {
        if !self.setup.toggle_goal_selection(goal)? {
            return Ok(Outcome::default());
        }
        Ok(self.changed(today, Vec::new()))
    }

    pub fn submit_selection(&mut self, today: NaiveDate) -> Result<Outcome> {
        self.setup.submit_selection()?;
        Ok(self.changed(today, Vec::new()))
    }

    pub fn set_habit_text(
        &mut self,
        goal_index: usize,
        habit_index: usize,
        text: &str,
        today: NaiveDate,
    ) -> Result<Outcome> {
        self.setup.set_habit_text(goal_index, habit_index, text)?;
        Ok(self.changed(today, Vec::new()))
    }

    pub fn submit_habits(&mut self, today: NaiveDate) -> Result<Outcome> {
        self.setup.submit_habits()?;
        Ok(self.changed(today, Vec::new()))
    }

    // ── Dashboard actions ────────────────────────────────────────────

    pub fn edit_goal(&mut self, index: usize, text: &str, today: NaiveDate) -> Result<Outcome> {
        self.setup.edit_goal(index, text)?;
        let unlocked = self.editor_triggers(ManualTrigger::GoalEdited);
        Ok(self.changed(today, unlocked))
    }

    pub fn edit_habit(
        &mut self,
        goal_index: usize,
        habit_index: usize,
        text: &str,
        today: NaiveDate,
    ) -> Result<Outcome> {
        self.setup.edit_habit(goal_index, habit_index, text)?;
        let unlocked = self.editor_triggers(ManualTrigger::HabitEdited);
        Ok(self.changed(today, unlocked))
    }

    /// Flip one habit slot for the day of `now`.
    ///
    /// Completing a habit also runs the event detectors (time of day,
    /// diversity, perfect days, comeback) at this call site.
    pub fn toggle_completion(&mut self, key: CompletionKey, now: NaiveDateTime) -> Result<ToggleOutcome> {
        self.setup.require(Stage::Dashboard, "toggleCompletion")?;
        let today = now.date();
        key.validate()?;
        if self.setup.habits()[key.goal_index][key.habit_index].trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "habit".to_string(),
                message: format!("slot {key} has no habit defined"),
            }
            .into());
        }
        let toggle = self.tracker.toggle(key, today)?;

        let mut unlocked = self.refresh(today);
        if toggle.completed {
            let ctx = CompletionContext {
                now,
                today: self.tracker.today(),
                history: self.tracker.history(),
                goal_count: self.setup.selected_goals().len(),
                habit_count: self.setup.defined_habit_count(),
            };
            for trigger in triggers::detect(&ctx) {
                unlocked.extend(self.achievements.trigger(trigger));
            }
        }

        Ok(ToggleOutcome {
            key,
            completed: toggle.completed,
            completed_today: toggle.completed_today,
            total_completed: toggle.total_completed,
            unlocked,
        })
    }

    /// Midnight rollover: empty today's set, keep everything else.
    pub fn reset_day(&mut self) -> Outcome {
        let cleared = self.tracker.clear_today();
        tracing::info!(cleared, "daily reset");
        Outcome {
            changed: cleared > 0,
            unlocked: Vec::new(),
        }
    }

    fn editor_triggers(&mut self, edit: ManualTrigger) -> Unlocked {
        let mut unlocked: Unlocked = self.achievements.trigger(edit).into_iter().collect();
        let both = [ManualTrigger::GoalEdited, ManualTrigger::HabitEdited]
            .into_iter()
            .filter_map(crate::achievements::for_trigger)
            .all(|a| self.achievements.is_unlocked(a.id));
        if both {
            unlocked.extend(self.achievements.trigger(ManualTrigger::GoalAndHabitEdited));
        }
        unlocked
    }
}
