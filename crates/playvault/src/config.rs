//! Resolve CLI flags, env vars and the config file into an `SdkConfig`.
//!
//! Precedence: command-line flags (and their `PLAYVAULT_*` env vars) win
//! over the selected profile, which wins over `[defaults]`.

use secrecy::SecretString;

use playvault_config::{Config, Profile};
use playvault_core::SdkConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The profile a command runs against, plus the SDK config built from it.
pub struct Resolved {
    pub profile_name: String,
    pub sdk: SdkConfig,
}

/// Profile named by `--profile`, else the config's default, else "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // A bare --host works without any config file.
        None if global.host.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(playvault_config::ConfigError::UnknownProfile { name: profile_name }.into());
        }
        None => {
            return Err(CliError::NoConfig {
                path: playvault_config::config_path().display().to_string(),
            });
        }
    };

    if let Some(ref host) = global.host {
        profile.hosts = vec![host.clone()];
        profile.fixed_host = true;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => playvault_config::resolve_api_key(&profile, &profile_name)?,
    };

    let mut sdk = playvault_config::profile_to_sdk_config(&profile, &cfg.defaults, api_key)?;
    sdk.session_token = global
        .token
        .clone()
        .map(SecretString::from)
        .or_else(|| playvault_config::load_session_token(&profile_name));
    sdk.user_agent = Some(format!("playvault-cli/{}", env!("CARGO_PKG_VERSION")));

    Ok(Resolved { profile_name, sdk })
}
