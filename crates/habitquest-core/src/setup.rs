//! Onboarding state machine: five goals, two focus goals, three habits each.
//!
//! ## Stage Transitions
//!
//! ```text
//! Goals -> Select -> Habits -> Dashboard
//!   (any) -> Error   (snapshot load failure only)
//! ```
//!
//! Every submit validates before advancing and leaves the stage untouched on
//! failure. Edits are only accepted once the dashboard is reached.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, StageError, ValidationError};

/// Number of candidate goals.
pub const GOAL_COUNT: usize = 5;
/// Number of focus goals picked from the candidates.
pub const SELECTED_GOAL_COUNT: usize = 2;
/// Habit slots per focus goal.
pub const HABITS_PER_GOAL: usize = 3;

pub type GoalSet = [String; GOAL_COUNT];
pub type HabitSlots = [String; HABITS_PER_GOAL];
/// Habits keyed by selected-goal index.
pub type HabitPlan = [HabitSlots; SELECTED_GOAL_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Goals,
    Select,
    Habits,
    Dashboard,
    Error,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Goals => "goals",
            Stage::Select => "select",
            Stage::Habits => "habits",
            Stage::Dashboard => "dashboard",
            Stage::Error => "error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_filled(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Owns goals, selection, habit plan, and the onboarding stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupMachine {
    goals: GoalSet,
    selected: Vec<String>,
    habits: HabitPlan,
    stage: Stage,
}

impl SetupMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts, inferring the stage from the data.
    pub fn hydrate(goals: GoalSet, selected: Vec<String>, habits: HabitPlan) -> Self {
        let mut selected = selected;
        selected.truncate(SELECTED_GOAL_COUNT);
        let stage = infer_stage(&goals, &selected, &habits);
        Self {
            goals,
            selected,
            habits,
            stage,
        }
    }

    /// Defaults with the stage forced to `Error` after a failed load.
    pub fn failed() -> Self {
        Self {
            stage: Stage::Error,
            ..Self::default()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn selected_goals(&self) -> &[String] {
        &self.selected
    }

    pub fn habits(&self) -> &HabitPlan {
        &self.habits
    }

    /// Habits that have text, across the selected goals.
    pub fn defined_habit_count(&self) -> usize {
        self.habits
            .iter()
            .take(self.selected.len())
            .flat_map(|slots| slots.iter())
            .filter(|h| is_filled(h))
            .count()
    }

    /// Non-empty habit slots of one selected goal.
    pub fn defined_habits_for(&self, goal_index: usize) -> usize {
        self.habits
            .get(goal_index)
            .map(|slots| slots.iter().filter(|h| is_filled(h)).count())
            .unwrap_or(0)
    }

    /// At least one selected goal has all of its habit slots filled.
    pub fn is_setup_complete(&self) -> bool {
        (0..self.selected.len())
            .any(|i| self.defined_habits_for(i) == HABITS_PER_GOAL)
    }

    // ── Goals stage ──────────────────────────────────────────────────

    pub fn set_goal_text(&mut self, index: usize, text: &str) -> Result<()> {
        self.require(Stage::Goals, "setGoalText")?;
        let slot = self
            .goals
            .get_mut(index)
            .ok_or_else(|| out_of_bounds("goals", index, GOAL_COUNT))?;
        *slot = text.to_string();
        Ok(())
    }

    pub fn submit_goals(&mut self) -> Result<Stage> {
        self.require(Stage::Goals, "submitGoals")?;
        let filled = self.goals.iter().filter(|g| is_filled(g)).count();
        if filled < GOAL_COUNT {
            return Err(ValidationError::IncompleteGoals { filled }.into());
        }
        let mut seen = HashSet::new();
        for goal in &self.goals {
            if !seen.insert(goal.as_str()) {
                return Err(ValidationError::DuplicateGoal { goal: goal.clone() }.into());
            }
        }
        self.advance(Stage::Select);
        Ok(self.stage)
    }

    // ── Select stage ─────────────────────────────────────────────────

    /// Toggle a goal in or out of the selection. Adding a third goal is
    /// ignored. Returns whether the selection changed.
    pub fn toggle_goal_selection(&mut self, goal: &str) -> Result<bool> {
        self.require(Stage::Select, "toggleGoalSelection")?;
        if let Some(pos) = self.selected.iter().position(|g| g == goal) {
            self.selected.remove(pos);
            return Ok(true);
        }
        if !self.goals.iter().any(|g| g == goal && is_filled(g)) {
            return Err(ValidationError::UnknownGoal {
                goal: goal.to_string(),
            }
            .into());
        }
        if self.selected.len() < SELECTED_GOAL_COUNT {
            self.selected.push(goal.to_string());
            return Ok(true);
        }
        Ok(false)
    }

    pub fn submit_selection(&mut self) -> Result<Stage> {
        self.require(Stage::Select, "submitSelection")?;
        if self.selected.len() != SELECTED_GOAL_COUNT {
            return Err(ValidationError::SelectionCount {
                selected: self.selected.len(),
            }
            .into());
        }
        self.advance(Stage::Habits);
        Ok(self.stage)
    }

    // ── Habits stage ─────────────────────────────────────────────────

    pub fn set_habit_text(&mut self, goal_index: usize, habit_index: usize, text: &str) -> Result<()> {
        self.require(Stage::Habits, "setHabitText")?;
        *self.habit_slot_mut(goal_index, habit_index)? = text.to_string();
        Ok(())
    }

    pub fn submit_habits(&mut self) -> Result<Stage> {
        self.require(Stage::Habits, "submitHabits")?;
        for goal_index in 0..SELECTED_GOAL_COUNT {
            if self.defined_habits_for(goal_index) < HABITS_PER_GOAL {
                return Err(ValidationError::IncompleteHabits { goal_index }.into());
            }
        }
        self.advance(Stage::Dashboard);
        Ok(self.stage)
    }

    // ── Dashboard edits ──────────────────────────────────────────────

    /// Rename a selected goal. The matching candidate goal is renamed too so
    /// the selection stays drawn from the goal set.
    pub fn edit_goal(&mut self, index: usize, text: &str) -> Result<()> {
        self.require(Stage::Dashboard, "editGoal")?;
        let len = self.selected.len();
        let old = self
            .selected
            .get(index)
            .cloned()
            .ok_or_else(|| out_of_bounds("selectedGoals", index, len))?;
        if !is_filled(text) {
            return Err(blank("goal"));
        }
        if text != old && self.goals.iter().any(|g| g == text) {
            return Err(ValidationError::DuplicateGoal {
                goal: text.to_string(),
            }
            .into());
        }
        if let Some(candidate) = self.goals.iter_mut().find(|g| **g == old) {
            *candidate = text.to_string();
        }
        self.selected[index] = text.to_string();
        Ok(())
    }

    pub fn edit_habit(&mut self, goal_index: usize, habit_index: usize, text: &str) -> Result<()> {
        self.require(Stage::Dashboard, "editHabit")?;
        if !is_filled(text) {
            return Err(blank("habit"));
        }
        *self.habit_slot_mut(goal_index, habit_index)? = text.to_string();
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    pub(crate) fn require(&self, stage: Stage, action: &'static str) -> Result<()> {
        if self.stage != stage {
            return Err(StageError::NotPermitted {
                action,
                stage: self.stage,
            }
            .into());
        }
        Ok(())
    }

    fn advance(&mut self, next: Stage) {
        tracing::info!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    fn habit_slot_mut(&mut self, goal_index: usize, habit_index: usize) -> Result<&mut String> {
        let slots = self
            .habits
            .get_mut(goal_index)
            .ok_or_else(|| out_of_bounds("habitPlan", goal_index, SELECTED_GOAL_COUNT))?;
        slots
            .get_mut(habit_index)
            .ok_or_else(|| out_of_bounds("habitSlots", habit_index, HABITS_PER_GOAL))
    }
}

fn out_of_bounds(collection: &str, index: usize, len: usize) -> crate::error::CoreError {
    ValidationError::OutOfBounds {
        collection: collection.to_string(),
        index,
        len,
    }
    .into()
}

fn blank(field: &str) -> crate::error::CoreError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: "text must not be empty".to_string(),
    }
    .into()
}

/// Stage implied by loaded data.
///
/// `Dashboard` when two goals are selected and each has a non-empty habit,
/// else `Habits` when two goals are selected, else `Select` when any goal
/// has text, else `Goals`.
pub fn infer_stage(goals: &GoalSet, selected: &[String], habits: &HabitPlan) -> Stage {
    let two_selected = selected.len() == SELECTED_GOAL_COUNT;
    let habits_per_goal = habits
        .iter()
        .take(SELECTED_GOAL_COUNT)
        .all(|slots| slots.iter().any(|h| is_filled(h)));

    if two_selected && habits_per_goal {
        Stage::Dashboard
    } else if two_selected {
        Stage::Habits
    } else if goals.iter().any(|g| is_filled(g)) {
        Stage::Select
    } else {
        Stage::Goals
    }
}
