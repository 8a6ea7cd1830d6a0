//! Interactive confirmation before a batch run.
use dialoguer::Confirm;

use crate::errors::ReshapeError;

/// Builds the `[y/N]` question shown before a batch run. Declining is the
/// default.
fn confirmation(question: &str) -> Confirm<'static> {
    Confirm::new()
        .with_prompt(question)
        .default(false)
        .show_default(true)
}

/// Asks `question` on the terminal. Escape or `q` count as no.
pub fn confirm(question: &str) -> Result<bool, ReshapeError> {
    Ok(confirmation(question).interact_opt()?.unwrap_or(false))
}
