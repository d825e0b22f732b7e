//! Cloud save command handlers.

use std::io::Write;

use bytesize::ByteSize;
use tabled::Tabled;

use playvault_core::{SaveSlot, Sdk};

use crate::cli::{GlobalOpts, SaveArgs, SaveCommand};
use crate::error::CliError;
use crate::output;

use super::notify;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&SaveSlot> for SlotRow {
    fn from(s: &SaveSlot) -> Self {
        Self {
            slot: s.slot.clone(),
            size: ByteSize::b(s.size_bytes).to_string(),
            updated: s.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(sdk: &Sdk, args: SaveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SaveCommand::List => {
            let slots = sdk.cloud_save().list_slots().await?;
            let out = output::render_list(
                &global.output,
                &slots,
                |s| SlotRow::from(s),
                |s| s.slot.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SaveCommand::Put { slot, file } => {
            let data = tokio::fs::read(&file).await?;
            let size = ByteSize::b(u64::try_from(data.len()).unwrap_or(u64::MAX));
            sdk.cloud_save().save(&slot, data).await?;
            notify(global, &format!("Saved {size} to slot '{slot}'"));
            Ok(())
        }

        SaveCommand::Get { slot, out } => {
            let Some(data) = sdk.cloud_save().load(&slot).await? else {
                return Err(CliError::NotFound {
                    resource_type: "Save slot".into(),
                    identifier: slot,
                    list_command: "save list".into(),
                });
            };
            match out {
                Some(path) => {
                    tokio::fs::write(&path, &data).await?;
                    notify(global, &format!("Wrote slot '{slot}' to {}", path.display()));
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&data)?;
                    stdout.flush()?;
                }
            }
            Ok(())
        }

        SaveCommand::Delete { slot } => {
            let resp = sdk.cloud_save().delete(&slot).await?;
            let message = if resp.message.is_empty() {
                format!("Deleted slot '{slot}'")
            } else {
                resp.message
            };
            notify(global, &message);
            Ok(())
        }
    }
}
