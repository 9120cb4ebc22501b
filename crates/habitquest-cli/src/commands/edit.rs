//! Dashboard editing commands.

use clap::Subcommand;
use habitquest_core::error::Result;
use habitquest_core::{Config, Session};

use super::{close_session, open_session, print_unlocked, CliResult};

#[derive(Subcommand)]
pub enum EditAction {
    /// Rename a selected goal
    Goal {
        /// Selected goal index (0 or 1)
        index: usize,
        text: String,
    },
    /// Rename a habit
    Habit {
        /// Selected goal index (0 or 1)
        goal: usize,
        /// Habit index (0-2)
        habit: usize,
        text: String,
    },
}

pub async fn run(action: EditAction, config: &Config) -> CliResult {
    let session = open_session(config).await?;
    let result = apply(action, &session);
    close_session(session, result.is_ok()).await?;
    result?;
    Ok(())
}

fn apply(action: EditAction, session: &Session) -> Result<()> {
    let outcome = match action {
        EditAction::Goal { index, text } => {
            let outcome = session.edit_goal(index, &text)?;
            println!("Goal {index} renamed to '{text}'");
            outcome
        }
        EditAction::Habit { goal, habit, text } => {
            let outcome = session.edit_habit(goal, habit, &text)?;
            println!("Habit {goal}-{habit} renamed to '{text}'");
            outcome
        }
    };
    print_unlocked(&outcome.unlocked);
    Ok(())
}
