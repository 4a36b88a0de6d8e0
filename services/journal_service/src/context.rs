use core::fmt;
use std::env;

use aws_config::BehaviorVersion;
use chrono::Duration;
use service_core::ddb::Adapter;

use crate::assignment::ddb_repository::{DdbAssignmentsRepository, DdbSubmissionsRepository};
use crate::group::ddb_repository::{DdbGroupsRepository, DdbMembershipsRepository};
use crate::journal::ddb_repository::{DdbFeedbackRepository, DdbLogEntriesRepository};
use crate::uploads::FileStore;
use crate::user_account::ddb_repository::DdbAccountsRepository;

pub(crate) enum ContextKey {
    DynamoDbEndpoint,
    AccountsTableName,
    GroupsTableName,
    MembershipsTableName,
    LogEntriesTableName,
    AssignmentsTableName,
    SubmissionsTableName,
    FeedbackTableName,
    UploadRoot,
    TokenSecret,
    SessionTtlSeconds,
    RememberSessionTtlSeconds,
    MaxUploadBytes,
    BindAddress,
}

pub(crate) struct Context {
    pub dynamodb_adapter: Adapter,
    pub accounts_table_name: String,
    pub groups_table_name: String,
    pub memberships_table_name: String,
    pub log_entries_table_name: String,
    pub assignments_table_name: String,
    pub submissions_table_name: String,
    pub feedback_table_name: String,
    pub file_store: FileStore,
    /// Base64-encoded token signing secret.
    pub token_secret: String,
    pub session_ttl: Duration,
    pub remember_session_ttl: Duration,
    pub bind_address: String,
    pub max_payload_bytes: usize,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DynamoDbEndpoint => write!(f, "DYNAMODB_ENDPOINT"),
            Self::AccountsTableName => write!(f, "ACCOUNTS_TABLE_NAME"),
            Self::GroupsTableName => write!(f, "GROUPS_TABLE_NAME"),
            Self::MembershipsTableName => write!(f, "MEMBERSHIPS_TABLE_NAME"),
            Self::LogEntriesTableName => write!(f, "LOG_ENTRIES_TABLE_NAME"),
            Self::AssignmentsTableName => write!(f, "ASSIGNMENTS_TABLE_NAME"),
            Self::SubmissionsTableName => write!(f, "SUBMISSIONS_TABLE_NAME"),
            Self::FeedbackTableName => write!(f, "FEEDBACK_TABLE_NAME"),
            Self::UploadRoot => write!(f, "UPLOAD_ROOT"),
            Self::TokenSecret => write!(f, "TOKEN_SECRET"),
            Self::SessionTtlSeconds => write!(f, "SESSION_TTL_SECONDS"),
            Self::RememberSessionTtlSeconds => write!(f, "REMEMBER_SESSION_TTL_SECONDS"),
            Self::MaxUploadBytes => write!(f, "MAX_UPLOAD_BYTES"),
            Self::BindAddress => write!(f, "BIND_ADDRESS"),
        }
    }
}

impl Context {
    pub async fn from_env() -> Self {
        let shared_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let dynamodb_config = if let Some(endpoint) = Context::key(&ContextKey::DynamoDbEndpoint) {
            log::info!("Using DynamoDB with endpoint: {}.", endpoint);
            aws_sdk_dynamodb::config::Builder::from(&shared_config)
                .endpoint_url(endpoint)
                .build()
        } else {
            aws_sdk_dynamodb::config::Builder::from(&shared_config).build()
        };

        let client = aws_sdk_dynamodb::Client::from_conf(dynamodb_config);
        Context {
            dynamodb_adapter: client.into(),
            accounts_table_name: Context::key_or(&ContextKey::AccountsTableName, "Accounts"),
            groups_table_name: Context::key_or(&ContextKey::GroupsTableName, "Groups"),
            memberships_table_name: Context::key_or(&ContextKey::MembershipsTableName, "Memberships"),
            log_entries_table_name: Context::key_or(&ContextKey::LogEntriesTableName, "LogEntries"),
            assignments_table_name: Context::key_or(&ContextKey::AssignmentsTableName, "Assignments"),
            submissions_table_name: Context::key_or(&ContextKey::SubmissionsTableName, "Submissions"),
            feedback_table_name: Context::key_or(&ContextKey::FeedbackTableName, "Feedback"),
            file_store: FileStore::new(Context::key_or(&ContextKey::UploadRoot, "uploads")),
            // "dev-secret-key", base64-encoded. Deployments override this.
            token_secret: Context::key_or(&ContextKey::TokenSecret, "ZGV2LXNlY3JldC1rZXk="),
            session_ttl: Duration::seconds(Context::key_parsed(&ContextKey::SessionTtlSeconds, 3600)),
            remember_session_ttl: Duration::seconds(Context::key_parsed(
                &ContextKey::RememberSessionTtlSeconds,
                7 * 24 * 3600,
            )),
            bind_address: Context::key_or(&ContextKey::BindAddress, "0.0.0.0:8080"),
            max_payload_bytes: Context::key_parsed(&ContextKey::MaxUploadBytes, 16 * 1024 * 1024),
        }
    }

    pub fn accounts(&self) -> DdbAccountsRepository<Adapter> {
        DdbAccountsRepository::new(self.dynamodb_adapter.clone(), &self.accounts_table_name)
    }

    pub fn groups(&self) -> DdbGroupsRepository<Adapter> {
        DdbGroupsRepository::new(self.dynamodb_adapter.clone(), &self.groups_table_name)
    }

    pub fn memberships(&self) -> DdbMembershipsRepository<Adapter> {
        DdbMembershipsRepository::new(self.dynamodb_adapter.clone(), &self.memberships_table_name)
    }

    pub fn log_entries(&self) -> DdbLogEntriesRepository<Adapter> {
        DdbLogEntriesRepository::new(self.dynamodb_adapter.clone(), &self.log_entries_table_name)
    }

    pub fn feedback(&self) -> DdbFeedbackRepository<Adapter> {
        DdbFeedbackRepository::new(self.dynamodb_adapter.clone(), &self.feedback_table_name)
    }

    pub fn assignments(&self) -> DdbAssignmentsRepository<Adapter> {
        DdbAssignmentsRepository::new(self.dynamodb_adapter.clone(), &self.assignments_table_name)
    }

    pub fn submissions(&self) -> DdbSubmissionsRepository<Adapter> {
        DdbSubmissionsRepository::new(self.dynamodb_adapter.clone(), &self.submissions_table_name)
    }

    pub fn key(key: &ContextKey) -> Option<String> {
        env::var(key.to_string()).ok()
    }

    fn key_or(key: &ContextKey, default: &str) -> String {
        Context::key(key).unwrap_or_else(|| default.to_owned())
    }

    fn key_parsed<V: std::str::FromStr + Copy>(key: &ContextKey, default: V) -> V {
        match Context::key(key) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring unparseable value for {}: {}.", key, raw);
                default
            }),
            None => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_key_reads_the_environment() {
        env::set_var(ContextKey::SessionTtlSeconds.to_string(), "120");
        assert_eq!(Context::key_parsed(&ContextKey::SessionTtlSeconds, 3600i64), 120);
        env::remove_var(ContextKey::SessionTtlSeconds.to_string());
    }

    #[test]
    fn unset_or_garbage_key_falls_back_to_the_default() {
        assert_eq!(Context::key_parsed(&ContextKey::MaxUploadBytes, 16usize), 16);

        env::set_var(ContextKey::RememberSessionTtlSeconds.to_string(), "not-a-number");
        assert_eq!(Context::key_parsed(&ContextKey::RememberSessionTtlSeconds, 7i64), 7);
        env::remove_var(ContextKey::RememberSessionTtlSeconds.to_string());
    }
}
