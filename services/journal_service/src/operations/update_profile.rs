use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::session::Identity;
use crate::uploads::{FileStore, UploadCategory, UploadError, UploadedFile};
use crate::user_account::{
    AccountLookup, AccountsRepository, GetAccountError, ProfileUpdate, UpdateAccountError,
};

#[derive(Debug, TypedBuilder)]
pub(crate) struct UpdateProfileInput {
    #[builder(setter(into))]
    pub full_name: String,

    #[builder(setter(into))]
    pub email: String,

    #[builder(default)]
    pub contact_details: Option<String>,

    #[builder(default)]
    pub avatar: Option<UploadedFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProfileOutput {
    pub account_id: Uuid,
    pub avatar: Option<String>,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum UpdateProfileError {
    #[error("Account not found.")]
    AccountNotFound,

    #[error("An account with this email already exists.")]
    DuplicateEmail,
}

impl OperationError for UpdateProfileError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateEmail => StatusCode::CONFLICT,
        }
    }
}

/// Updates the caller's profile fields and optionally replaces the avatar.
/// The previous avatar file is removed only after the row update lands.
pub(crate) async fn update_profile(
    identity: &Identity,
    accounts: &impl AccountsRepository,
    files: &FileStore,
    input: UpdateProfileInput,
) -> Result<UpdateProfileOutput, EndpointError<UpdateProfileError>> {
    if input.full_name.trim().is_empty() {
        return Err(EndpointError::validation("Full name must not be empty."));
    }
    let email = input.email.trim();
    if !validator::validate_email(email) {
        return Err(EndpointError::validation("Email is invalid."));
    }

    let current = accounts
        .get_account(&AccountLookup::ById(identity.account_id))
        .await
        .map_err(|e| match e {
            GetAccountError::NotFound => EndpointError::operation(UpdateProfileError::AccountNotFound),
            e => {
                log::error!("Failed to get account: {:?}", e);
                EndpointError::internal()
            }
        })?;

    if email != current.email {
        match accounts.get_account(&AccountLookup::ByEmail(email.to_owned())).await {
            Ok(other) if other.account_id != identity.account_id => {
                return Err(EndpointError::operation(UpdateProfileError::DuplicateEmail));
            }
            Ok(_) | Err(GetAccountError::NotFound) => {}
            Err(e) => {
                log::error!("Failed to check email uniqueness: {:?}", e);
                return Err(EndpointError::internal());
            }
        }
    }

    let new_avatar = match &input.avatar {
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

    let update = ProfileUpdate {
        full_name: input.full_name.trim().to_owned(),
        email: email.to_owned(),
        contact_details: input
            .contact_details
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        avatar: new_avatar.as_ref().map(|s| s.relative_path().to_owned()),
    };
    accounts
        .update_profile(&identity.account_id, &update)
        .await
        .map_err(|e| match e {
            UpdateAccountError::NotFound => EndpointError::operation(UpdateProfileError::AccountNotFound),
            UpdateAccountError::Other(e) => {
                log::error!("Failed to update profile: {:?}", e);
                EndpointError::internal()
            }
        })?;

    let avatar = match new_avatar {
        Some(stored) => {
            if let Some(old) = &current.avatar {
                files.remove(old);
            }
            Some(stored.persist())
        }
        None => current.avatar,
    };

    Ok(UpdateProfileOutput {
        account_id: identity.account_id,
        avatar,
    })
}
