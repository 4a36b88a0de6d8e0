use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use typed_builder::TypedBuilder;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::uploads::{FileStore, UploadCategory, UploadError, UploadedFile};
use crate::user_account::{hash_password, AccountRole, AccountsRepository, CreateAccountError, UserAccount};

#[derive(Debug, TypedBuilder)]
pub(crate) struct RegisterInput {
    #[builder(setter(into))]
    pub username: String,

    #[builder(setter(into))]
    pub email: String,

    #[builder(setter(into))]
    pub full_name: String,

    #[builder(setter(into))]
    pub password: String,

    #[builder(setter(into))]
    pub confirm_password: String,

    #[builder(setter(into))]
    pub role: String,

    #[builder(default)]
    pub avatar: Option<UploadedFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterOutput {
    pub account_id: Uuid,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum RegisterError {
    #[error("An account with this username already exists.")]
    DuplicateUsername,

    #[error("An account with this email already exists.")]
    DuplicateEmail,

    #[error("Passwords do not match.")]
    PasswordMismatch,
}

impl OperationError for RegisterError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateUsername | Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::PasswordMismatch => StatusCode::BAD_REQUEST,
        }
    }
}

#[tracing::instrument(skip_all)]
pub(crate) async fn register(
    accounts: &impl AccountsRepository,
    files: &FileStore,
    mut input: RegisterInput,
) -> Result<RegisterOutput, EndpointError<RegisterError>> {
    for (value, msg) in [
        (&input.username, "Username must not be empty."),
        (&input.full_name, "Full name must not be empty."),
        (&input.password, "Password must not be empty."),
    ] {
        if value.trim().is_empty() {
            return Err(EndpointError::validation(msg));
        }
    }
    if input.password != input.confirm_password {
        input.password.zeroize();
        input.confirm_password.zeroize();
        return Err(EndpointError::operation(RegisterError::PasswordMismatch));
    }

    let role: AccountRole = input
        .role
        .parse()
        .map_err(|_| EndpointError::validation("Role must be teacher or student."))?;
    if role == AccountRole::Admin {
        return Err(EndpointError::validation("Role must be teacher or student."));
    }

    let password_hash = hash_password(&input.password).map_err(|e| {
        log::error!("Failed to hash password: {:?}", e);
        EndpointError::internal()
    })?;
    input.password.zeroize();
    input.confirm_password.zeroize();

    // A bad avatar never blocks registration; it is skipped with a warning.
    let avatar = match &input.avatar {
        Some(file) => match files.save(UploadCategory::Profiles, &file.filename, &file.contents) {
            Ok(stored) => Some(stored),
            Err(UploadError::NoFile) | Err(UploadError::UnsupportedType) => {
                log::warn!("Skipping avatar {:?}: not an accepted image type.", file.filename);
                None
            }
            Err(UploadError::Io(e)) => {
                log::error!("Failed to store avatar: {:?}", e);
                return Err(EndpointError::internal());
            }
        },
        None => None,
    };

    let builder = UserAccount::builder()
        .username(input.username.trim())
        .email(input.email.trim())
        .full_name(input.full_name.trim())
        .password(password_hash)
        .role(role);
    let account = match &avatar {
        Some(stored) => builder.avatar(stored.relative_path()).build(),
        None => builder.build(),
    };

    accounts.create_account(&account).await.map_err(|e| match e {
        CreateAccountError::DuplicateUsername => EndpointError::operation(RegisterError::DuplicateUsername),
        CreateAccountError::DuplicateEmail => EndpointError::operation(RegisterError::DuplicateEmail),
        CreateAccountError::Validation(msg) => EndpointError::validation(msg),
        CreateAccountError::Other(e) => {
            log::error!("Failed to create account: {:?}", e);
            EndpointError::internal()
        }
    })?;

    // The account row is committed; the avatar file may now outlive this call.
    if let Some(stored) = avatar {
        stored.persist();
    }

    Ok(RegisterOutput {
        account_id: account.account_id,
    })
}
