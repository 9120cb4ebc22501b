use habitquest_core::Config;

use super::{open_session, CliResult};

/// Level, streak and today's progress.
pub async fn run(json: bool, config: &Config) -> CliResult {
    let session = open_session(config).await?;
    let view = session.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Stage: {}", view.stage);
    println!(
        "Level {} ({} XP, {} / 100 into level, {} to next)",
        view.level, view.experience, view.xp_into_level, view.xp_to_next_level
    );
    println!("Streak: {} day(s)", view.streak);
    println!(
        "Today: {}/{} ({}%)",
        view.completed_today, view.habit_count, view.completion_percentage_today
    );
    for goal in &view.goal_progress {
        println!("  {}: {}/{} ({}%)", goal.goal, goal.completed, goal.total, goal.percent);
    }
    println!("Lifetime completions: {}", view.total_completed);
    println!("Achievements: {}", view.unlocked_achievements.len());
    Ok(())
}
