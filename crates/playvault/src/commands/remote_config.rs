//! Remote config command handler.

use serde::Serialize;
use tabled::Tabled;

use playvault_core::Sdk;

use crate::cli::{GlobalOpts, RemoteConfigArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct ConfigEntry {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub async fn handle(
    sdk: &Sdk,
    args: RemoteConfigArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = sdk.remote_config().fetch().await?;

    let out = match args.key {
        Some(key) => match config.get(&key) {
            Some(value) => value.to_owned(),
            None => {
                return Err(CliError::NotFound {
                    resource_type: "Remote config key".into(),
                    identifier: key,
                    list_command: "remote-config".into(),
                });
            }
        },
        None => {
            let entries: Vec<ConfigEntry> = config
                .configs
                .iter()
                .map(|(key, value)| ConfigEntry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect();
            output::render_list(
                &global.output,
                &entries,
                |e| ConfigEntry {
                    key: e.key.clone(),
                    value: e.value.clone(),
                },
                |e| format!("{}={}", e.key, e.value),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
