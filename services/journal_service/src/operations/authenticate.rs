use chrono::Duration;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::session::issue_token;
use crate::user_account::{verify_password, AccountLookup, AccountsRepository, GetAccountError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub(crate) struct AuthenticateInput {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthenticateOutput {
    pub account_id: Uuid,
    pub role: String,
    pub full_name: String,
    pub remember: bool,
    #[serde(skip)]
    pub token: String,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum AuthenticateError {
    #[error("Invalid username or password.")]
    InvalidCredentials,
}

impl OperationError for AuthenticateError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Verifies credentials and mints a session token. Unknown usernames and
/// wrong passwords fail identically, so the endpoint does not leak which
/// usernames exist.
pub(crate) async fn authenticate(
    accounts: &impl AccountsRepository,
    token_secret: &str,
    session_ttl: Duration,
    remember_session_ttl: Duration,
    mut input: AuthenticateInput,
) -> Result<AuthenticateOutput, EndpointError<AuthenticateError>> {
    let mut account = accounts
        .get_account(&AccountLookup::ByUsername(input.username.clone()))
        .await
        .map_err(|e| match e {
            GetAccountError::NotFound => EndpointError::operation(AuthenticateError::InvalidCredentials),
            e => {
                log::error!("Failed to look up account: {:?}", e);
                EndpointError::internal()
            }
        })?;

    let verify_result = verify_password(&input.password, &account.password);
    input.password.zeroize();
    account.password.zeroize();

    use argon2::password_hash::Error::Password as PasswordErr;
    verify_result.map_err(|e| match e {
        PasswordErr => EndpointError::operation(AuthenticateError::InvalidCredentials),
        e => {
            log::error!("Password verification failed: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let ttl = if input.remember {
        remember_session_ttl
    } else {
        session_ttl
    };
    let token = issue_token(token_secret, ttl, &account).map_err(|e| {
        log::error!("Failed encoding the session token: {:?}", e);
        EndpointError::internal()
    })?;

    Ok(AuthenticateOutput {
        account_id: account.account_id,
        role: account.role.to_string(),
        full_name: account.full_name,
        remember: input.remember,
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::verify_token;
    use crate::testing::InMemoryAccounts;
    use crate::user_account::{hash_password, AccountRole, UserAccount};

    const SECRET: &str = "c2VjcmV0LXNpZ25pbmcta2V5";

    async fn seeded_accounts() -> InMemoryAccounts {
        let accounts = InMemoryAccounts::default();
        let account = UserAccount::builder()
            .username("jdoe")
            .email("jdoe@example.com")
            .full_name("Jane Doe")
            .password(hash_password("hunter2!").unwrap())
            .role(AccountRole::Teacher)
            .build();
        accounts.create_account(&account).await.unwrap();
        accounts
    }

    fn input(username: &str, password: &str, remember: bool) -> AuthenticateInput {
        AuthenticateInput {
            username: username.to_owned(),
            password: password.to_owned(),
            remember,
        }
    }

    #[tokio::test]
    async fn valid_credentials_issue_a_token() {
        let accounts = seeded_accounts().await;
        let output = authenticate(
            &accounts,
            SECRET,
            Duration::hours(1),
            Duration::days(7),
            input("jdoe", "hunter2!", false),
        )
        .await
        .unwrap();

        let claims = verify_token(SECRET, &output.token).unwrap();
        assert_eq!(claims.sub, output.account_id.to_string());
        assert_eq!(output.role, "teacher");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_username_fail_alike() {
        let accounts = seeded_accounts().await;

        let wrong_password = authenticate(
            &accounts,
            SECRET,
            Duration::hours(1),
            Duration::days(7),
            input("jdoe", "nope", false),
        )
        .await
        .unwrap_err();
        let unknown_user = authenticate(
            &accounts,
            SECRET,
            Duration::hours(1),
            Duration::days(7),
            input("ghost", "hunter2!", false),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn remember_extends_the_session() {
        let accounts = seeded_accounts().await;
        let output = authenticate(
            &accounts,
            SECRET,
            Duration::hours(1),
            Duration::days(7),
            input("jdoe", "hunter2!", true),
        )
        .await
        .unwrap();

        let claims = verify_token(SECRET, &output.token).unwrap();
        let lifetime = claims.exp - chrono::Utc::now().timestamp();
        assert!(lifetime > Duration::days(6).num_seconds());
    }
}
