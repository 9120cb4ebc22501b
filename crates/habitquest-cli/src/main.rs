use clap::{CommandFactory, Parser, Subcommand};
use habitquest_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitquest", version, about = "HabitQuest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Onboarding: goals, selection, habits
    Setup {
        #[command(subcommand)]
        action: commands::setup::SetupAction,
    },
    /// Daily habit tracking
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Edit goals and habits after setup
    Edit {
        #[command(subcommand)]
        action: commands::edit::EditAction,
    },
    /// Level, streak and today's progress
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Achievement catalog
    Achievements {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Only show unlocked achievements
        #[arg(long)]
        unlocked: bool,
    },
    /// Activity history
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let result = match cli.command {
        Commands::Setup { action } => commands::setup::run(action, &config).await,
        Commands::Habit { action } => commands::habit::run(action, &config).await,
        Commands::Edit { action } => commands::edit::run(action, &config).await,
        Commands::Stats { json } => commands::stats::run(json, &config).await,
        Commands::Achievements { json, unlocked } => {
            commands::achievements::run(json, unlocked, &config).await
        }
        Commands::Activity { action } => commands::activity::run(action, &config).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habitquest", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
