//! Config subcommand handlers.

use playvault_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

use super::notify;

const REDACTED: &str = "********";

/// Blank out plaintext secrets before the config is displayed.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
    }
    cfg
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &playvault_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(playvault_config::load_config()?);
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?} ({e})")),
                |_| "config".into(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = playvault_config::load_config()?;
            let active = active_profile_name(global, &cfg);
            let lines: Vec<String> = cfg
                .profiles
                .iter()
                .map(|(name, profile)| {
                    let marker = if *name == active { "*" } else { " " };
                    format!("{marker} {name}  {}", profile.hosts.join(", "))
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::AddProfile {
            name,
            hosts,
            api_key_env,
            fixed_host,
        } => {
            // Reject bad URLs before anything is written.
            playvault_config::parse_hosts(&hosts)?;

            let mut cfg = playvault_config::load_config()?;
            cfg.profiles.insert(
                name.clone(),
                Profile {
                    hosts,
                    fixed_host,
                    api_key_env,
                    ..Profile::default()
                },
            );
            if cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            playvault_config::save_config(&cfg)?;
            notify(global, &format!("Profile '{name}' saved"));
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = playvault_config::load_config()?;
            cfg.profile(Some(&name))?;
            cfg.default_profile = Some(name.clone());
            playvault_config::save_config(&cfg)?;
            notify(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }
    }
}
