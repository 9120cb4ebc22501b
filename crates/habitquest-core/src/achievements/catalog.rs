//! The fixed, ordered achievement catalog.

use serde::Serialize;

/// How an achievement gets unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Rule {
    StreakThreshold(u32),
    LevelThreshold(u64),
    LifetimeCountThreshold(u64),
    SetupComplete,
    /// Never satisfied by the stats scan; unlocked by the call site that
    /// observes the event.
    Manual(ManualTrigger),
}

/// Events that unlock manual achievements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualTrigger {
    GoalEdited,
    HabitEdited,
    /// Both a goal and a habit have been edited.
    GoalAndHabitEdited,
    PerfectWeek,
    HabitDiversity,
    Comeback,
    EarlyCompletion,
    LateCompletion,
    PerfectWeekend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub name: &'static str,
    /// Shown while locked (a teaser for hidden entries).
    pub description: &'static str,
    /// Replaces `description` once unlocked.
    pub unlocked_description: Option<&'static str>,
    pub rule: Rule,
    pub hidden: bool,
}

/// Name shown for hidden achievements until they are unlocked.
pub const MASKED_NAME: &str = "???";

impl AchievementDefinition {
    const fn new(id: &'static str, name: &'static str, description: &'static str, rule: Rule) -> Self {
        Self {
            id,
            name,
            description,
            unlocked_description: None,
            rule,
            hidden: false,
        }
    }

    const fn hidden(
        id: &'static str,
        name: &'static str,
        teaser: &'static str,
        unlocked_description: &'static str,
        trigger: ManualTrigger,
    ) -> Self {
        Self {
            id,
            name,
            description: teaser,
            unlocked_description: Some(unlocked_description),
            rule: Rule::Manual(trigger),
            hidden: true,
        }
    }

    pub fn display_name(&self, unlocked: bool) -> &'static str {
        if self.hidden && !unlocked {
            MASKED_NAME
        } else {
            self.name
        }
    }

    pub fn display_description(&self, unlocked: bool) -> &'static str {
        match (unlocked, self.unlocked_description) {
            (true, Some(text)) => text,
            _ => self.description,
        }
    }
}

use ManualTrigger as M;
use Rule::*;

pub static CATALOG: &[AchievementDefinition] = &[
    // Streaks
    AchievementDefinition::new("streak1", "First Spark", "Complete all habits for 1 day.", StreakThreshold(1)),
    AchievementDefinition::new("streak3", "Consistency Cultivator", "Complete all habits for 3 consecutive days.", StreakThreshold(3)),
    AchievementDefinition::new("streak7", "Weekly Warrior", "Complete all habits for 7 consecutive days.", StreakThreshold(7)),
    AchievementDefinition::new("streak14", "Fortnightly Fire", "Maintain a habit streak for 14 days.", StreakThreshold(14)),
    AchievementDefinition::new("streak30", "Monthly Master", "Achieve a 30-day habit streak.", StreakThreshold(30)),
    AchievementDefinition::new("streak100", "Century Champion", "Achieve a 100-day habit streak.", StreakThreshold(100)),
    // Levels
    AchievementDefinition::new("level5", "Level 5 Hero", "Reach level 5.", LevelThreshold(5)),
    AchievementDefinition::new("level10", "Level 10 Champion", "Reach level 10.", LevelThreshold(10)),
    AchievementDefinition::new("level20", "Level 20 Legend", "Reach level 20.", LevelThreshold(20)),
    AchievementDefinition::new("level30", "Level 30 Mythic", "Reach level 30.", LevelThreshold(30)),
    AchievementDefinition::new("level50", "Level 50 Immortal", "Reach level 50.", LevelThreshold(50)),
    AchievementDefinition::new("level100", "Level 100 Deity", "Reach level 100.", LevelThreshold(100)),
    // Lifetime completions
    AchievementDefinition::new("habitMaster10", "Habit Initiate (10)", "Complete 10 habits in total.", LifetimeCountThreshold(10)),
    AchievementDefinition::new("habitMaster50", "Habit Adept (50)", "Complete 50 habits in total.", LifetimeCountThreshold(50)),
    AchievementDefinition::new("habitMaster100", "Habit Veteran (100)", "Complete 100 habits in total.", LifetimeCountThreshold(100)),
    AchievementDefinition::new("habitMaster250", "Habit Expert (250)", "Complete 250 habits in total.", LifetimeCountThreshold(250)),
    AchievementDefinition::new("habitMaster500", "Habit Master (500)", "Complete 500 habits in total.", LifetimeCountThreshold(500)),
    AchievementDefinition::new("habitMaster1000", "Habit Grandmaster (1000)", "Complete 1000 habits in total.", LifetimeCountThreshold(1000)),
    // Setup
    AchievementDefinition::new("firstGoal", "Quest Giver", "Set your first goals and habits.", SetupComplete),
    AchievementDefinition::new("goalEditor", "Quest Refiner", "Edit a goal to better suit your journey.", Manual(M::GoalEdited)),
    AchievementDefinition::new("habitEditor", "Habit Sculptor", "Edit a habit to better align with your goals.", Manual(M::HabitEdited)),
    // Special
    AchievementDefinition::new("perfectWeek", "Perfect Week", "Complete all habits every day for a full week.", Manual(M::PerfectWeek)),
    AchievementDefinition::new("habitDiversity", "Habit Diversity", "Complete habits from all your different goals in a single day.", Manual(M::HabitDiversity)),
    AchievementDefinition::new("comebackKid", "Comeback Kid", "Break a streak and then start a new one of at least 3 days.", Manual(M::Comeback)),
    // Hidden
    AchievementDefinition::hidden("hidden1", "Early Bird", "Keep exploring and completing habits...", "Completed a habit before 8 AM.", M::EarlyCompletion),
    AchievementDefinition::hidden("hidden2", "Night Owl", "Something special awaits...", "Completed a habit after 10 PM.", M::LateCompletion),
    AchievementDefinition::hidden("hidden3", "Weekend Warrior", "A mysterious achievement...", "Completed all habits on both Saturday and Sunday.", M::PerfectWeekend),
    AchievementDefinition::hidden("hidden4", "Habit Explorer", "An enigmatic challenge...", "Edited at least one goal and one habit.", M::GoalAndHabitEdited),
];

pub fn find(id: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|a| a.id == id)
}

pub fn for_trigger(trigger: ManualTrigger) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|a| a.rule == Rule::Manual(trigger))
}
