//! News command handler.

use tabled::Tabled;

use playvault_core::{NewsItem, Sdk};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NewsRow {
    #[tabled(rename = "Published")]
    published: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&NewsItem> for NewsRow {
    fn from(n: &NewsItem) -> Self {
        Self {
            published: n.published_at.format("%Y-%m-%d %H:%M").to_string(),
            title: n.title.clone(),
            id: n.id.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(sdk: &Sdk, global: &GlobalOpts) -> Result<(), CliError> {
    let items = sdk.news().latest().await?;
    let out = output::render_list(
        &global.output,
        items.as_slice(),
        |n| NewsRow::from(n),
        |n| n.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
