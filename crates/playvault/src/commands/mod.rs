//! Command dispatch: bridges CLI args -> SDK managers -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod feedback;
pub mod leaderboard;
pub mod news;
pub mod redeem;
pub mod remote_config;
pub mod saves;
pub mod status;

use playvault_core::Sdk;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    sdk: &Sdk,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(sdk, global),
        Command::Auth(args) => auth::handle(sdk, args, profile, global).await,
        Command::News => news::handle(sdk, global).await,
        Command::Leaderboard(args) => leaderboard::handle(sdk, args, global).await,
        Command::RemoteConfig(args) => remote_config::handle(sdk, args, global).await,
        Command::Save(args) => saves::handle(sdk, args, global).await,
        Command::Redeem { code } => redeem::handle(sdk, &code, global).await,
        Command::Feedback(args) => feedback::handle_feedback(sdk, &args, global).await,
        Command::Log(args) => feedback::handle_log(sdk, &args, global).await,
        // Handled in main before the SDK starts
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Print a status line on stderr unless `--quiet`.
pub(crate) fn notify(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        let color = crate::output::should_color(&global.color);
        eprintln!("{}", crate::output::success(message, color));
    }
}
