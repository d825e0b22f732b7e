//! Feedback and remote log handlers.

use std::str::FromStr;

use strum::VariantNames;

use playvault_core::{FeedbackCategory, LogLevel, Sdk};

use crate::cli::{FeedbackArgs, GlobalOpts, LogArgs};
use crate::error::CliError;

use super::notify;

fn parse_choice<T>(field: &str, raw: &str) -> Result<T, CliError>
where
    T: FromStr + VariantNames,
{
    T::from_str(raw).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not one of: {}", T::VARIANTS.join(", ")),
    })
}

pub async fn handle_feedback(
    sdk: &Sdk,
    args: &FeedbackArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let category: FeedbackCategory = parse_choice("category", &args.category)?;
    let resp = sdk.feedback().submit(category, &args.message).await?;
    let message = if resp.message.is_empty() {
        "Feedback sent".to_owned()
    } else {
        resp.message
    };
    notify(global, &message);
    Ok(())
}

pub async fn handle_log(sdk: &Sdk, args: &LogArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let level: LogLevel = parse_choice("level", &args.level)?;
    sdk.remote_log().send(level, &args.message).await?;
    notify(global, &format!("Logged at {level}"));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn choices_parse_case_insensitively() {
        let category: FeedbackCategory = parse_choice("category", "BUG").unwrap();
        assert_eq!(category, FeedbackCategory::Bug);
        let level: LogLevel = parse_choice("level", "Warning").unwrap();
        assert_eq!(level, LogLevel::Warning);
    }

    #[test]
    fn unknown_choice_lists_variants() {
        let err = parse_choice::<FeedbackCategory>("category", "praise").unwrap_err();
        assert!(err.to_string().contains("bug, suggestion, payment, other"));
    }
}
