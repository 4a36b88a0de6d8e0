use uuid::Uuid;

use crate::user_account::{AccountLookup, AccountsRepository, GetAccountError};

pub(crate) mod add_feedback;
pub(crate) mod authenticate;
pub(crate) mod create_assignment;
pub(crate) mod create_group;
pub(crate) mod create_log;
pub(crate) mod dashboard;
pub(crate) mod describe_assignment;
pub(crate) mod describe_group;
pub(crate) mod describe_log;
pub(crate) mod generate_report;
pub(crate) mod get_timeline;
pub(crate) mod grade_submission;
pub(crate) mod join_group;
pub(crate) mod register;
pub(crate) mod submit_assignment;
pub(crate) mod update_profile;

/// Resolves an account id to a display name. A dangling reference renders as
/// "Unknown" instead of failing the whole page.
pub(crate) async fn display_name(
    accounts: &impl AccountsRepository,
    account_id: &Uuid,
) -> Result<String, GetAccountError> {
    match accounts.get_account(&AccountLookup::ById(*account_id)).await {
        Ok(account) => Ok(account.full_name),
        Err(GetAccountError::NotFound) => {
            log::warn!("Account {} referenced but not found.", account_id);
            Ok(String::from("Unknown"))
        }
        Err(e) => Err(e),
    }
}
