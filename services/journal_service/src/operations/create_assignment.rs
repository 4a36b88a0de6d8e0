use chrono::{DateTime, NaiveDateTime, Utc};
use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::assignment::{Assignment, AssignmentsRepository, CreateAssignmentError as RepoError};
use crate::group::{GetGroupError, GroupsRepository};
use crate::session::Identity;
use crate::uploads::{FileStore, UploadCategory, UploadError, UploadedFile};
use crate::user_account::AccountRole;

const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, TypedBuilder)]
pub(crate) struct CreateAssignmentInput {
    pub group_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    #[builder(setter(into))]
    pub description: String,

    /// Due date in `YYYY-MM-DDTHH:MM`, matching `datetime-local` inputs.
    #[builder(setter(into))]
    pub due_at: String,

    #[builder(default)]
    pub question_file: Option<UploadedFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAssignmentOutput {
    pub assignment_id: Uuid,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum CreateAssignmentOpError {
    #[error("Group not found.")]
    GroupNotFound,

    #[error("Only the group's teacher can create assignments.")]
    NotOwner,

    #[error("This file type is not permitted.")]
    UnsupportedFileType,
}

impl OperationError for CreateAssignmentOpError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::GroupNotFound => StatusCode::NOT_FOUND,
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::UnsupportedFileType => StatusCode::BAD_REQUEST,
        }
    }
}

pub(crate) async fn create_assignment(
    identity: &Identity,
    groups: &impl GroupsRepository,
    assignments: &impl AssignmentsRepository,
    files: &FileStore,
    input: CreateAssignmentInput,
) -> Result<CreateAssignmentOutput, EndpointError<CreateAssignmentOpError>> {
    let group = groups.get_group(&input.group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => EndpointError::operation(CreateAssignmentOpError::GroupNotFound),
        e => {
            log::error!("Failed to get group: {:?}", e);
            EndpointError::internal()
        }
    })?;

    if identity.role != AccountRole::Admin && group.teacher_id != identity.account_id {
        return Err(EndpointError::operation(CreateAssignmentOpError::NotOwner));
    }
    if input.title.trim().is_empty() {
        return Err(EndpointError::validation("Title must not be empty."));
    }

    let due_at = parse_due_date(&input.due_at)
        .ok_or_else(|| EndpointError::validation("Due date must use the YYYY-MM-DDTHH:MM format."))?;

    let question_file = match &input.question_file {
        Some(file) => Some(
            files
                .save(UploadCategory::Questions, &file.filename, &file.contents)
                .map_err(|e| match e {
                    UploadError::NoFile | UploadError::UnsupportedType => {
                        EndpointError::operation(CreateAssignmentOpError::UnsupportedFileType)
                    }
                    UploadError::Io(e) => {
                        log::error!("Failed to store question file: {:?}", e);
                        EndpointError::internal()
                    }
                })?,
        ),
        None => None,
    };

    let builder = Assignment::builder()
        .group_id(group.group_id)
        .teacher_id(identity.account_id)
        .title(input.title.trim())
        .description(input.description.trim())
        .due_at(due_at);
    let assignment = match &question_file {
        Some(stored) => builder.question_file(stored.relative_path()).build(),
        None => builder.build(),
    };

    assignments.create_assignment(&assignment).await.map_err(|e| match e {
        RepoError::Validation(msg) => EndpointError::validation(msg),
        RepoError::Other(e) => {
            log::error!("Failed to create assignment: {:?}", e);
            EndpointError::internal()
        }
    })?;

    if let Some(stored) = question_file {
        stored.persist();
    }

    Ok(CreateAssignmentOutput {
        assignment_id: assignment.assignment_id,
    })
}

fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), DUE_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
