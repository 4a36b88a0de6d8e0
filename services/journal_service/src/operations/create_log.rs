use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::group::{GetGroupError, GroupsRepository, MembershipsRepository};
use crate::journal::{CreateEntryError, LogEntriesRepository, LogEntry};
use crate::session::Identity;
use crate::uploads::{FileStore, UploadCategory, UploadError, UploadedFile};

#[derive(Debug, TypedBuilder)]
pub(crate) struct CreateLogInput {
    pub group_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    #[builder(setter(into))]
    pub body: String,

    #[builder(default)]
    pub media: Option<UploadedFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateLogOutput {
    pub log_id: Uuid,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum CreateLogError {
    #[error("Group not found.")]
    GroupNotFound,

    #[error("Only group members can post log entries.")]
    NotAMember,

    #[error("This file type is not permitted.")]
    UnsupportedFileType,
}

impl OperationError for CreateLogError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::GroupNotFound => StatusCode::NOT_FOUND,
            Self::NotAMember => StatusCode::FORBIDDEN,
            Self::UnsupportedFileType => StatusCode::BAD_REQUEST,
        }
    }
}

pub(crate) async fn create_log(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    entries: &impl LogEntriesRepository,
    files: &FileStore,
    input: CreateLogInput,
) -> Result<CreateLogOutput, EndpointError<CreateLogError>> {
    let group = groups.get_group(&input.group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => EndpointError::operation(CreateLogError::GroupNotFound),
        e => {
            log::error!("Failed to get group: {:?}", e);
            EndpointError::internal()
        }
    })?;

    // Only enrolled students write journal entries; the owning teacher
    // responds through feedback instead.
    let is_member = memberships
        .membership(&group.group_id, &identity.account_id)
        .await
        .map_err(|e| {
            log::error!("Failed to check membership: {:?}", e);
            EndpointError::internal()
        })?
        .is_some();
    if !is_member {
        return Err(EndpointError::operation(CreateLogError::NotAMember));
    }

    if input.title.trim().is_empty() {
        return Err(EndpointError::validation("Title must not be empty."));
    }
    if input.body.trim().is_empty() {
        return Err(EndpointError::validation("Body must not be empty."));
    }

    let media = match &input.media {
        Some(file) => Some(
            files
                .save(UploadCategory::Media, &file.filename, &file.contents)
                .map_err(|e| match e {
                    UploadError::NoFile | UploadError::UnsupportedType => {
                        EndpointError::operation(CreateLogError::UnsupportedFileType)
                    }
                    UploadError::Io(e) => {
                        log::error!("Failed to store media file: {:?}", e);
                        EndpointError::internal()
                    }
                })?,
        ),
        None => None,
    };

    let builder = LogEntry::builder()
        .group_id(group.group_id)
        .author_id(identity.account_id)
        .title(input.title.trim())
        .body(input.body.trim());
    let entry = match &media {
        Some(stored) => builder.media(stored.relative_path()).build(),
        None => builder.build(),
    };

    entries.create_entry(&entry).await.map_err(|e| match e {
        CreateEntryError::Validation(msg) => EndpointError::validation(msg),
        CreateEntryError::Other(e) => {
            log::error!("Failed to create log entry: {:?}", e);
            EndpointError::internal()
        }
    })?;

    if let Some(stored) = media {
        stored.persist();
    }

    Ok(CreateLogOutput { log_id: entry.log_id })
}
