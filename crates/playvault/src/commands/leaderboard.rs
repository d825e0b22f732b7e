//! Leaderboard command handlers.

use tabled::Tabled;

use playvault_core::{LeaderboardEntry, Sdk};

use crate::cli::{GlobalOpts, LeaderboardArgs, LeaderboardCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    rank: u32,
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Score")]
    score: i64,
}

impl From<&LeaderboardEntry> for EntryRow {
    fn from(e: &LeaderboardEntry) -> Self {
        Self {
            rank: e.rank,
            player: e
                .display_name
                .clone()
                .unwrap_or_else(|| e.player_id.clone()),
            score: e.score,
        }
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    sdk: &Sdk,
    args: LeaderboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = match args.command {
        LeaderboardCommand::Top { board, limit } => {
            let entries = sdk.leaderboard().top(&board, limit).await?;
            output::render_list(
                &global.output,
                entries.as_slice(),
                |e| EntryRow::from(e),
                |e| e.player_id.clone(),
            )?
        }

        LeaderboardCommand::Submit { board, score } => {
            let result = sdk.leaderboard().submit(&board, score).await?;
            if !result.accepted {
                return Err(CliError::Rejected {
                    message: format!("score {score} was not accepted on '{board}'"),
                });
            }
            output::render_single(
                &global.output,
                &result,
                |r| {
                    [
                        output::detail_line("Rank", &opt(r.rank), color),
                        output::detail_line("Best score", &opt(r.best_score), color),
                    ]
                    .join("\n")
                },
                |r| opt(r.rank),
            )?
        }

        LeaderboardCommand::Rank { board } => {
            let rank = sdk.leaderboard().rank(&board).await?;
            output::render_single(
                &global.output,
                &rank,
                |r| {
                    [
                        output::detail_line("Rank", &r.rank.to_string(), color),
                        output::detail_line("Score", &r.score.to_string(), color),
                        output::detail_line("Players", &opt(r.total_players), color),
                    ]
                    .join("\n")
                },
                |r| r.rank.to_string(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
