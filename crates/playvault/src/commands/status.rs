//! `status`: which host was selected and what came up.

use serde::Serialize;

use playvault_core::Sdk;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Status {
    host: Option<String>,
    services: Vec<&'static str>,
    signed_in: bool,
}

pub fn handle(sdk: &Sdk, global: &GlobalOpts) -> Result<(), CliError> {
    let status = Status {
        host: sdk.active_host().map(|h| h.to_string()),
        services: sdk.services().to_vec(),
        signed_in: sdk.context().session().has_session_token(),
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &status,
        |s| {
            [
                output::detail_line("Host", s.host.as_deref().unwrap_or("-"), color),
                output::detail_line("Services", &s.services.join(", "), color),
                output::detail_line("Session", if s.signed_in { "stored" } else { "none" }, color),
            ]
            .join("\n")
        },
        |s| s.host.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
