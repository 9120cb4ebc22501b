use habitquest_core::Config;

use super::{open_session, CliResult};

/// List the achievement catalog. Hidden entries stay masked until unlocked.
pub async fn run(json: bool, unlocked_only: bool, config: &Config) -> CliResult {
    let session = open_session(config).await?;
    let views: Vec<_> = session
        .achievement_views()
        .into_iter()
        .filter(|a| a.unlocked || !unlocked_only)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for a in &views {
        let mark = if a.unlocked { "x" } else { " " };
        println!("[{mark}] {:<20} {}", a.name, a.description);
    }
    let unlocked = views.iter().filter(|a| a.unlocked).count();
    println!("{unlocked} unlocked");
    Ok(())
}
