use http::StatusCode;
use serde::{Deserialize, Serialize};
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use crate::group::{GetGroupError, GroupsRepository};
use crate::journal::{AddFeedbackError as RepoError, Feedback, FeedbackRepository, GetEntryError, LogEntriesRepository};
use crate::session::Identity;
use crate::user_account::AccountRole;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub(crate) struct AddFeedbackInput {
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddFeedbackOutput {
    pub feedback_id: Uuid,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum AddFeedbackError {
    #[error("Log entry not found.")]
    LogNotFound,

    #[error("Only the group's teacher can leave feedback.")]
    NotOwner,

    #[error("Feedback must not be empty.")]
    EmptyFeedback,
}

impl OperationError for AddFeedbackError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::LogNotFound => StatusCode::NOT_FOUND,
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::EmptyFeedback => StatusCode::BAD_REQUEST,
        }
    }
}

pub(crate) async fn add_feedback(
    identity: &Identity,
    groups: &impl GroupsRepository,
    entries: &impl LogEntriesRepository,
    feedback: &impl FeedbackRepository,
    log_id: &Uuid,
    input: AddFeedbackInput,
) -> Result<AddFeedbackOutput, EndpointError<AddFeedbackError>> {
    let entry = entries.get_entry(log_id).await.map_err(|e| match e {
        GetEntryError::NotFound => EndpointError::operation(AddFeedbackError::LogNotFound),
        e => {
            log::error!("Failed to get log entry: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let group = groups.get_group(&entry.group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => {
            log::error!("Log entry {} references missing group {}.", entry.log_id, entry.group_id);
            EndpointError::internal()
        }
        e => {
            log::error!("Failed to get group: {:?}", e);
            EndpointError::internal()
        }
    })?;

    if identity.role != AccountRole::Admin && group.teacher_id != identity.account_id {
        return Err(EndpointError::operation(AddFeedbackError::NotOwner));
    }
    if input.body.trim().is_empty() {
        return Err(EndpointError::operation(AddFeedbackError::EmptyFeedback));
    }

    let item = Feedback::builder()
        .log_id(entry.log_id)
        .teacher_id(identity.account_id)
        .body(input.body.trim())
        .build();
    feedback.add_feedback(&item).await.map_err(|e| match e {
        RepoError::Other(e) => {
            log::error!("Failed to add feedback: {:?}", e);
            EndpointError::internal()
        }
    })?;

    Ok(AddFeedbackOutput {
        feedback_id: item.feedback_id,
    })
}
