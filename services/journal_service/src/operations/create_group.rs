use http::StatusCode;
use serde::{Deserialize, Serialize};
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use crate::group::{CreateGroupError, Group, GroupsRepository};
use crate::session::Identity;
use crate::user_account::AccountRole;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub(crate) struct CreateGroupInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub join_secret: String,
    #[serde(default)]
    pub project_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateGroupOutput {
    pub group_id: Uuid,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum CreateGroupOpError {
    #[error("Only teachers can create groups.")]
    AccessDenied,

    #[error("A group with this join secret already exists.")]
    DuplicateJoinSecret,
}

impl OperationError for CreateGroupOpError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::DuplicateJoinSecret => StatusCode::CONFLICT,
        }
    }
}

pub(crate) async fn create_group(
    identity: &Identity,
    groups: &impl GroupsRepository,
    input: CreateGroupInput,
) -> Result<CreateGroupOutput, EndpointError<CreateGroupOpError>> {
    if identity.role == AccountRole::Student {
        return Err(EndpointError::operation(CreateGroupOpError::AccessDenied));
    }
    if input.name.trim().is_empty() {
        return Err(EndpointError::validation("Group name must not be empty."));
    }
    if input.join_secret.trim().is_empty() {
        return Err(EndpointError::validation("Join secret must not be empty."));
    }

    let builder = Group::builder()
        .name(input.name.trim())
        .description(input.description.trim())
        .teacher_id(identity.account_id)
        .join_secret(input.join_secret.trim());
    // Each optional setter advances the builder's type, so both branches
    // must finish the build themselves.
    let group = match &input.project_prompt {
        Some(prompt) => builder.project_prompt(prompt.clone()).build(),
        None => builder.build(),
    };

    groups.create_group(&group).await.map_err(|e| match e {
        CreateGroupError::DuplicateJoinSecret => EndpointError::operation(CreateGroupOpError::DuplicateJoinSecret),
        CreateGroupError::Validation(msg) => EndpointError::validation(msg),
        CreateGroupError::Other(e) => {
            log::error!("Failed to create group: {:?}", e);
            EndpointError::internal()
        }
    })?;

    Ok(CreateGroupOutput {
        group_id: group.group_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryGroups;

    fn input(name: &str, secret: &str) -> CreateGroupInput {
        CreateGroupInput {
            name: name.to_owned(),
            description: "Intro course".to_owned(),
            join_secret: secret.to_owned(),
            project_prompt: None,
        }
    }

    #[tokio::test]
    async fn teacher_creates_a_group() {
        let teacher = Identity::teacher();
        let groups = InMemoryGroups::default();

        let output = create_group(&teacher, &groups, input("CS101", "abc123")).await.unwrap();
        let stored = groups.get_group(&output.group_id).await.unwrap();
        assert_eq!(stored.name, "CS101");
        assert_eq!(stored.teacher_id, teacher.account_id);
    }

    #[tokio::test]
    async fn project_prompt_is_stored_when_given() {
        let teacher = Identity::teacher();
        let groups = InMemoryGroups::default();
        let mut with_prompt = input("CS101", "abc123");
        with_prompt.project_prompt = Some("Build a compiler.".to_owned());

        let output = create_group(&teacher, &groups, with_prompt).await.unwrap();
        let stored = groups.get_group(&output.group_id).await.unwrap();
        assert_eq!(stored.project_prompt.as_deref(), Some("Build a compiler."));
    }

    #[tokio::test]
    async fn student_is_refused() {
        let student = Identity::student();
        let groups = InMemoryGroups::default();

        let err = create_group(&student, &groups, input("CS101", "abc123")).await.unwrap_err();
        assert!(matches!(err, EndpointError::Operation(CreateGroupOpError::AccessDenied)));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reused_join_secret_is_refused() {
        let teacher = Identity::teacher();
        let groups = InMemoryGroups::default();
        create_group(&teacher, &groups, input("CS101", "abc123")).await.unwrap();

        let err = create_group(&teacher, &groups, input("CS102", "abc123")).await.unwrap_err();
        assert!(matches!(
            err,
            EndpointError::Operation(CreateGroupOpError::DuplicateJoinSecret)
        ));
    }

    #[tokio::test]
    async fn blank_name_is_a_validation_failure() {
        let teacher = Identity::teacher();
        let groups = InMemoryGroups::default();

        let err = create_group(&teacher, &groups, input("  ", "abc123")).await.unwrap_err();
        assert!(matches!(err, EndpointError::Validation(_)));
    }
}
