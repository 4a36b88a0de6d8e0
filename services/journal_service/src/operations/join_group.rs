use http::StatusCode;
use serde::{Deserialize, Serialize};
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use crate::group::{AddMemberError, GetGroupError, GroupsRepository, Membership, MembershipsRepository};
use crate::session::Identity;
use crate::user_account::AccountRole;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub(crate) struct JoinGroupInput {
    pub join_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JoinGroupOutput {
    pub group_id: Uuid,
    pub group_name: String,
    /// True when the caller was a member before this call.
    pub already_member: bool,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum JoinGroupError {
    #[error("Only students can join groups.")]
    AccessDenied,

    #[error("No group matches this join secret.")]
    GroupNotFound,
}

impl OperationError for JoinGroupError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::GroupNotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Joins the caller to the group matching the secret. Re-joining is not an
/// error; the response flags the membership as pre-existing instead.
pub(crate) async fn join_group(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    input: JoinGroupInput,
) -> Result<JoinGroupOutput, EndpointError<JoinGroupError>> {
    if identity.role != AccountRole::Student {
        return Err(EndpointError::operation(JoinGroupError::AccessDenied));
    }

    let group = groups
        .group_by_join_secret(input.join_secret.trim())
        .await
        .map_err(|e| match e {
            GetGroupError::NotFound => EndpointError::operation(JoinGroupError::GroupNotFound),
            e => {
                log::error!("Failed to look up group by join secret: {:?}", e);
                EndpointError::internal()
            }
        })?;

    let membership = Membership::builder()
        .group_id(group.group_id)
        .student_id(identity.account_id)
        .build();
    let already_member = match memberships.add_member(&membership).await {
        Ok(()) => false,
        Err(AddMemberError::AlreadyMember) => true,
        Err(AddMemberError::Other(e)) => {
            log::error!("Failed to add member: {:?}", e);
            return Err(EndpointError::internal());
        }
    };

    Ok(JoinGroupOutput {
        group_id: group.group_id,
        group_name: group.name,
        already_member,
    })
}
