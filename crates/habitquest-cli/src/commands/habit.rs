//! Daily habit tracking commands.

use clap::Subcommand;
use habitquest_core::error::Result;
use habitquest_core::{CompletionKey, Config, Session};

use super::{close_session, open_session, print_unlocked, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Mark a habit done (or undo it) for today
    Toggle {
        /// Habit key as "goal-habit", e.g. "0-2"
        key: CompletionKey,
    },
    /// List today's habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: HabitAction, config: &Config) -> CliResult {
    let session = open_session(config).await?;
    let result = apply(action, &session);
    close_session(session, result.is_ok()).await?;
    result?;
    Ok(())
}

fn apply(action: HabitAction, session: &Session) -> Result<()> {
    match action {
        HabitAction::Toggle { key } => {
            let outcome = session.toggle_completion(key)?;
            let verb = if outcome.completed { "done" } else { "undone" };
            println!(
                "{key} {verb} ({} today, {} lifetime)",
                outcome.completed_today, outcome.total_completed
            );
            print_unlocked(&outcome.unlocked);
        }
        HabitAction::List { json } => {
            let view = session.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view.habit_plan)?);
                return Ok(());
            }
            for (g, goal) in view.selected_goals.iter().enumerate() {
                println!("{goal}");
                for (h, habit) in view.habit_plan[g].iter().enumerate() {
                    let key = CompletionKey::new(g, h);
                    let mark = if view.today_completion_set.contains(&key.to_string()) {
                        "x"
                    } else {
                        " "
                    };
                    println!("  [{mark}] {key} {habit}");
                }
            }
            println!(
                "Today: {}/{} ({}%)",
                view.completed_today, view.habit_count, view.completion_percentage_today
            );
        }
    }
    Ok(())
}
