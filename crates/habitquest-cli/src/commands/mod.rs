pub mod achievements;
pub mod activity;
pub mod config;
pub mod edit;
pub mod habit;
pub mod setup;
pub mod stats;

use std::sync::Arc;

use habitquest_core::{AchievementDefinition, Config, Session, SqliteStore, SystemClock, User};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open a session for the local profile against the on-disk store.
pub async fn open_session(config: &Config) -> Result<Session, Box<dyn std::error::Error>> {
    let store = Arc::new(SqliteStore::open()?);
    let user = User::verified(config.profile.user_id.clone(), config.profile.email.clone());
    let session = Session::start(user, store, config, Arc::new(SystemClock)).await?;
    Ok(session)
}

/// Write pending changes if the command succeeded, then stop the
/// background tasks. A failed command leaves the stored document untouched.
pub async fn close_session(mut session: Session, commit: bool) -> CliResult {
    let flushed = if commit {
        session.flush().await
    } else {
        Ok(())
    };
    session.teardown();
    flushed?;
    Ok(())
}

pub fn print_unlocked(unlocked: &[&AchievementDefinition]) {
    for a in unlocked {
        println!("Achievement unlocked: {} - {}", a.name, a.display_description(true));
    }
}
