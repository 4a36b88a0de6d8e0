pub mod ddb_repository;
pub mod password;
pub mod repository;
pub mod types;

pub use password::{hash_password, verify_password};
pub use repository::{
    AccountLookup, AccountsRepository, CreateAccountError, GetAccountError, ProfileUpdate, UpdateAccountError,
};
pub use types::{AccountRole, UserAccount};
