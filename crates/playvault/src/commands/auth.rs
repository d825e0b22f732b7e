//! Auth command handlers.
//!
//! A successful sign-in stores the session token in the keyring under the
//! active profile, so later invocations reuse it.

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use playvault_core::{Player, Sdk};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::notify;

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    sdk: &Sdk,
    args: AuthArgs,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let player = match args.command {
        AuthCommand::Guest { device_id } => {
            let device_id = device_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            sdk.auth().guest_login(&device_id).await?
        }

        AuthCommand::Login { email } => {
            let password = SecretString::from(rpassword::prompt_password("Password: ")?);
            sdk.auth().login(&email, &password).await?
        }

        AuthCommand::Register {
            email,
            display_name,
        } => {
            let password = SecretString::from(rpassword::prompt_password("Password: ")?);
            sdk.auth().register(&email, &password, &display_name).await?
        }

        AuthCommand::Logout => {
            sdk.auth().logout().await?;
            playvault_config::clear_session_token(profile)?;
            notify(global, "Signed out");
            return Ok(());
        }
    };

    persist_token(sdk, profile);
    print_player(&player, global)
}

/// Save the current session token for later runs. Keyring failures are
/// logged, not fatal.
fn persist_token(sdk: &Sdk, profile: &str) {
    let Some(token) = sdk
        .context()
        .session()
        .snapshot()
        .and_then(|snapshot| snapshot.token)
    else {
        return;
    };
    if let Err(e) = playvault_config::store_session_token(profile, token.expose_secret()) {
        warn!(error = %e, "could not store session token in keyring");
    }
}

fn print_player(player: &Player, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        player,
        |p| {
            [
                output::detail_line("Player ID", &p.player_id, color),
                output::detail_line("Name", p.display_name.as_deref().unwrap_or("-"), color),
                output::detail_line("Guest", if p.guest { "yes" } else { "no" }, color),
            ]
            .join("\n")
        },
        |p| p.player_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
