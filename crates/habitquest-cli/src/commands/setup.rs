//! Onboarding commands: goals, selection, habits.

use clap::Subcommand;
use habitquest_core::error::Result;
use habitquest_core::{Config, Session, Stage};

use super::{close_session, open_session, print_unlocked, CliResult};

#[derive(Subcommand)]
pub enum SetupAction {
    /// Show the current onboarding stage and what comes next
    Status,
    /// Enter all five goals and submit them
    Goals {
        /// Five distinct goals
        #[arg(num_args = 5, required = true)]
        goals: Vec<String>,
    },
    /// Choose the two goals to focus on and submit the selection
    Select {
        #[arg(num_args = 2, required = true)]
        goals: Vec<String>,
    },
    /// Set one habit for a selected goal
    Habit {
        /// Selected goal index (0 or 1)
        goal: usize,
        /// Habit index (0-2)
        habit: usize,
        /// Habit text
        text: String,
    },
    /// Submit the habits and open the dashboard
    Finish,
}

fn next_step(stage: Stage) -> &'static str {
    match stage {
        Stage::Goals => "enter five goals with `habitquest setup goals`",
        Stage::Select => "pick two goals with `habitquest setup select`",
        Stage::Habits => "fill in habits with `habitquest setup habit`, then `habitquest setup finish`",
        Stage::Dashboard => "setup complete; track habits with `habitquest habit toggle`",
        Stage::Error => "the saved state could not be loaded; try again",
    }
}

pub async fn run(action: SetupAction, config: &Config) -> CliResult {
    let session = open_session(config).await?;
    let result = apply(action, &session);
    close_session(session, result.is_ok()).await?;
    result?;
    Ok(())
}

fn apply(action: SetupAction, session: &Session) -> Result<()> {
    match action {
        SetupAction::Status => {
            let stage = session.stage();
            println!("Stage: {stage}");
            println!("Next: {}", next_step(stage));
        }
        SetupAction::Goals { goals } => {
            for (i, goal) in goals.iter().enumerate() {
                session.set_goal_text(i, goal)?;
            }
            session.submit_goals()?;
            println!("Goals saved. Next: {}", next_step(session.stage()));
        }
        SetupAction::Select { goals } => {
            let selected = session.dashboard().setup().selected_goals().to_vec();
            for goal in selected.iter().filter(|g| !goals.contains(g)) {
                session.toggle_goal_selection(goal)?;
            }
            for goal in goals.iter().filter(|g| !selected.contains(g)) {
                session.toggle_goal_selection(goal)?;
            }
            session.submit_selection()?;
            println!("Selected: {}", goals.join(", "));
            println!("Next: {}", next_step(session.stage()));
        }
        SetupAction::Habit { goal, habit, text } => {
            session.set_habit_text(goal, habit, &text)?;
            println!("Habit {goal}-{habit} set to '{text}'");
        }
        SetupAction::Finish => {
            let outcome = session.submit_habits()?;
            println!("Setup complete. Welcome to your dashboard!");
            print_unlocked(&outcome.unlocked);
        }
    }
    Ok(())
}
