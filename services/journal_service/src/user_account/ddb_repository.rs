use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use common_macros::hash_map;
use serde::{Deserialize, Serialize};
use service_core::ddb::get_item::GetItemInput;
use service_core::ddb::put_item::PutItemInput;
use service_core::ddb::query::QueryInput;
use service_core::ddb::update_item::UpdateItemInput;
use uuid::Uuid;
use validator::validate_email;

use crate::ddb_interop::{self, ThreadSafeDdbClient};
use crate::user_account::{
    AccountLookup, AccountsRepository, CreateAccountError, GetAccountError, ProfileUpdate, UpdateAccountError,
    UserAccount,
};

pub struct DdbAccountsRepository<T: ThreadSafeDdbClient> {
    ddb: T,
    accounts_table_name: String,
}

/// Projection stored on the `AccountIdIndex` and `EmailIndex` GSIs; enough to
/// reconstruct the table key.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UsernameProjection {
    username: String,
}

impl<T: ThreadSafeDdbClient> DdbAccountsRepository<T> {
    pub fn new(ddb: T, accounts_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            accounts_table_name: accounts_table_name.into(),
        }
    }

    /// Given a username, creates the map used as key into the accounts table.
    fn account_key_from_username(&self, username: &str) -> HashMap<String, AttributeValue> {
        hash_map! {
            "Username".to_string() => AttributeValue::S(username.to_owned()),
        }
    }

    /// Resolves the table key for an account through one of the GSIs.
    async fn account_key_from_index(
        &self,
        index_name: &str,
        key_condition: &str,
        value: AttributeValue,
    ) -> Result<HashMap<String, AttributeValue>, GetAccountError> {
        let query_input = QueryInput::builder()
            .index_name(index_name)
            .table_name(self.accounts_table_name.as_str())
            .key_condition_expression(key_condition)
            .select(Select::AllProjectedAttributes)
            .expression_attribute_values(Some(hash_map! { ":v".to_string() => value }))
            .limit(1)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| GetAccountError::Other(e.into()))?;

        let item = output
            .items
            .ok_or_else(|| GetAccountError::Other("Malformed reply: missing items".into()))?
            .pop()
            .ok_or(GetAccountError::NotFound)?;
        let projection: UsernameProjection = ddb_interop::from_hashmap(item).map_err(GetAccountError::Serde)?;
        Ok(self.account_key_from_username(&projection.username))
    }

    /// Retrieves an account from the DynamoDB table given its key.
    async fn account(&self, key: HashMap<String, AttributeValue>) -> Result<UserAccount, GetAccountError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(key)
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| GetAccountError::Other(e.into()))?;

        match output.item {
            None => Err(GetAccountError::NotFound),
            Some(item) => {
                let user_account: UserAccount = ddb_interop::from_hashmap(item).map_err(GetAccountError::Serde)?;
                Ok(user_account)
            }
        }
    }

    /// The email has no uniqueness constraint at the storage layer; the GSI
    /// lookup before the insert is what enforces it.
    async fn email_taken(&self, email: &str) -> Result<bool, CreateAccountError> {
        match self
            .account_key_from_index("EmailIndex", "Email = :v", AttributeValue::S(email.to_owned()))
            .await
        {
            Ok(_) => Ok(true),
            Err(GetAccountError::NotFound) => Ok(false),
            Err(GetAccountError::Serde(e)) => Err(CreateAccountError::Other(e.into())),
            Err(GetAccountError::Other(e)) => Err(CreateAccountError::Other(e)),
        }
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> AccountsRepository for DdbAccountsRepository<T> {
    async fn create_account<'a>(&self, account: &'a UserAccount) -> Result<&'a Uuid, CreateAccountError> {
        if !validate_email(&account.email) {
            return Err(CreateAccountError::Validation("Email address is invalid."));
        }

        if account.password.is_empty() {
            return Err(CreateAccountError::Validation("Password is required."));
        }

        if self.email_taken(&account.email).await? {
            return Err(CreateAccountError::DuplicateEmail);
        }

        let item = ddb_interop::to_hashmap(&account).map_err(|e| CreateAccountError::Other(e.into()))?;
        let put_item_input = PutItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(Username)")
            .build();

        self.ddb.put_item(put_item_input).await.map_err(|err| match &err {
            SdkError::ServiceError(service_err) if service_err.err().is_conditional_check_failed_exception() => {
                CreateAccountError::DuplicateUsername
            }
            _ => CreateAccountError::Other(err.into()),
        })?;

        Ok(&account.account_id)
    }

    async fn get_account(&self, lookup: &AccountLookup) -> Result<UserAccount, GetAccountError> {
        let key = match lookup {
            AccountLookup::ByUsername(username) => self.account_key_from_username(username),
            AccountLookup::ById(id) => {
                self.account_key_from_index(
                    "AccountIdIndex",
                    "AccountId = :v",
                    AttributeValue::S(id.to_string()),
                )
                .await?
            }
            AccountLookup::ByEmail(email) => {
                self.account_key_from_index("EmailIndex", "Email = :v", AttributeValue::S(email.clone()))
                    .await?
            }
        };
        self.account(key).await
    }

    async fn update_profile(&self, account_id: &Uuid, update: &ProfileUpdate) -> Result<(), UpdateAccountError> {
        let key = self
            .account_key_from_index("AccountIdIndex", "AccountId = :v", AttributeValue::S(account_id.to_string()))
            .await
            .map_err(|e| match e {
                GetAccountError::NotFound => UpdateAccountError::NotFound,
                GetAccountError::Serde(e) => UpdateAccountError::Other(e.into()),
                GetAccountError::Other(e) => UpdateAccountError::Other(e),
            })?;

        let mut set_parts = vec!["FullName = :full_name", "Email = :email"];
        let mut values = hash_map! {
            ":full_name".to_string() => AttributeValue::S(update.full_name.clone()),
            ":email".to_string() => AttributeValue::S(update.email.clone()),
        };
        if let Some(contact_details) = &update.contact_details {
            set_parts.push("ContactDetails = :contact_details");
            values.insert(":contact_details".to_string(), AttributeValue::S(contact_details.clone()));
        }
        if let Some(avatar) = &update.avatar {
            set_parts.push("Avatar = :avatar");
            values.insert(":avatar".to_string(), AttributeValue::S(avatar.clone()));
        }

        let update_item_input = UpdateItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(key)
            .update_expression(format!("SET {}", set_parts.join(", ")))
            .condition_expression("attribute_exists(Username)")
            .expression_attribute_values(values)
            .build();

        self.ddb.update_item(update_item_input).await.map_err(|err| match &err {
            SdkError::ServiceError(service_err) if service_err.err().is_conditional_check_failed_exception() => {
                UpdateAccountError::NotFound
            }
            _ => UpdateAccountError::Other(err.into()),
        })?;

        Ok(())
    }
}
