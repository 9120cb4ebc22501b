use clap::Subcommand;
use habitquest_core::activity::{recent_activity, Intensity};
use habitquest_core::Config;

use super::{open_session, CliResult};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// The most recent days with completions
    Recent {
        #[arg(long)]
        json: bool,
    },
    /// Five-week completion heatmap
    Heatmap {
        #[arg(long)]
        json: bool,
    },
}

fn glyph(intensity: Intensity, is_future: bool) -> char {
    if is_future {
        return ' ';
    }
    match intensity {
        Intensity::None => '.',
        Intensity::Low => '░',
        Intensity::Medium => '▒',
        Intensity::High => '▓',
        Intensity::Full => '█',
    }
}

pub async fn run(action: ActivityAction, config: &Config) -> CliResult {
    let session = open_session(config).await?;

    match action {
        ActivityAction::Recent { json } => {
            let recent = recent_activity(session.dashboard().tracker().history());
            if json {
                println!("{}", serde_json::to_string_pretty(&recent)?);
            } else if recent.is_empty() {
                println!("No activity yet");
            } else {
                for entry in recent {
                    println!("{}  {} habit(s)", entry.date, entry.count);
                }
            }
        }
        ActivityAction::Heatmap { json } => {
            let cells = session.heatmap();
            if json {
                println!("{}", serde_json::to_string_pretty(&cells)?);
                return Ok(());
            }
            println!("Mo Tu We Th Fr Sa Su");
            for week in cells.chunks(7) {
                let row: Vec<String> = week
                    .iter()
                    .map(|c| {
                        let g = glyph(c.intensity, c.is_future);
                        if c.is_today {
                            format!("[{g}]")
                        } else {
                            format!(" {g} ")
                        }
                    })
                    .collect();
                println!("{}", row.join("").trim_end());
            }
        }
    }
    Ok(())
}
