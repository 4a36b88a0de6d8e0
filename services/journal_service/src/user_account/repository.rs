use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::UserAccount;

#[derive(Debug, Error)]
pub enum CreateAccountError {
    #[error("An account with this username already exists.")]
    DuplicateUsername,

    #[error("An account with this email already exists.")]
    DuplicateEmail,

    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum GetAccountError {
    #[error("Account not found.")]
    NotFound,

    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum UpdateAccountError {
    #[error("Account not found.")]
    NotFound,

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Clone, Debug)]
pub enum AccountLookup {
    ById(Uuid),
    ByUsername(String),
    ByEmail(String),
}

/// Mutable profile fields. Everything else on an account, the role included,
/// is immutable after registration.
#[derive(Clone, Debug)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub contact_details: Option<String>,
    pub avatar: Option<String>,
}

#[async_trait]
pub trait AccountsRepository {
    async fn create_account<'a>(&self, account: &'a UserAccount) -> Result<&'a Uuid, CreateAccountError>;

    async fn get_account(&self, lookup: &AccountLookup) -> Result<UserAccount, GetAccountError>;

    async fn update_profile(&self, account_id: &Uuid, update: &ProfileUpdate) -> Result<(), UpdateAccountError>;
}
