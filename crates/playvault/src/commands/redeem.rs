//! Gift code redemption.

use playvault_core::Sdk;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(sdk: &Sdk, code: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let resp = sdk.gift_codes().redeem(code).await?;
    if !resp.success {
        return Err(CliError::Rejected {
            message: if resp.message.is_empty() {
                format!("gift code '{code}' was not accepted")
            } else {
                resp.message
            },
        });
    }
    let out = output::render_single(
        &global.output,
        &resp,
        |r| r.message.clone(),
        |r| r.message.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
