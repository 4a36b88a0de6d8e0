use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use super::display_name;
use crate::assignment::{AssignmentsRepository, GetAssignmentError, SubmissionsRepository};
use crate::group::{has_access, GetGroupError, GroupsRepository, MembershipsRepository};
use crate::session::Identity;
use crate::user_account::{AccountRole, AccountsRepository};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeAssignmentOutput {
    pub assignment_id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub description: String,
    pub question_file: Option<String>,
    pub due_at: DateTime<Utc>,
    /// The caller's own submission for students, every submission for the
    /// owning teacher.
    pub submissions: Vec<SubmissionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionView {
    pub student_id: Uuid,
    pub student_name: String,
    pub file_path: String,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum DescribeAssignmentError {
    #[error("Assignment not found.")]
    AssignmentNotFound,

    #[error("You do not have access to this assignment.")]
    AccessDenied,
}

impl OperationError for DescribeAssignmentError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AssignmentNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
        }
    }
}

pub(crate) async fn describe_assignment(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    assignments: &impl AssignmentsRepository,
    submissions: &impl SubmissionsRepository,
    accounts: &impl AccountsRepository,
    assignment_id: &Uuid,
) -> Result<DescribeAssignmentOutput, EndpointError<DescribeAssignmentError>> {
    let assignment = assignments.get_assignment(assignment_id).await.map_err(|e| match e {
        GetAssignmentError::NotFound => EndpointError::operation(DescribeAssignmentError::AssignmentNotFound),
        e => {
            log::error!("Failed to get assignment: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let group = groups.get_group(&assignment.group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => {
            log::error!(
                "Assignment {} references missing group {}.",
                assignment.assignment_id,
                assignment.group_id
            );
            EndpointError::internal()
        }
        e => {
            log::error!("Failed to get group: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let allowed = has_access(identity, &group, memberships).await.map_err(|e| {
        log::error!("Failed to check group access: {:?}", e);
        EndpointError::internal()
    })?;
    if !allowed {
        return Err(EndpointError::operation(DescribeAssignmentError::AccessDenied));
    }

    let internal = |e: &dyn std::fmt::Debug| {
        log::error!("Failed to assemble assignment view: {:?}", e);
        EndpointError::internal()
    };

    let sees_all = identity.role == AccountRole::Admin || group.teacher_id == identity.account_id;
    let mut views = Vec::new();
    if sees_all {
        for submission in submissions
            .submissions_for_assignment(assignment_id)
            .await
            .map_err(|e| internal(&e))?
        {
            views.push(SubmissionView {
                student_name: display_name(accounts, &submission.student_id).await.map_err(|e| internal(&e))?,
                student_id: submission.student_id,
                file_path: submission.file_path,
                submitted_at: submission.submitted_at,
                grade: submission.grade,
                feedback: submission.feedback,
            });
        }
    } else if let Some(submission) = submissions
        .submission(assignment_id, &identity.account_id)
        .await
        .map_err(|e| internal(&e))?
    {
        views.push(SubmissionView {
            student_id: submission.student_id,
            student_name: identity.full_name.clone(),
            file_path: submission.file_path,
            submitted_at: submission.submitted_at,
            grade: submission.grade,
            feedback: submission.feedback,
        });
    }

    Ok(DescribeAssignmentOutput {
        assignment_id: assignment.assignment_id,
        group_id: assignment.group_id,
        title: assignment.title,
        description: assignment.description,
        question_file: assignment.question_file,
        due_at: assignment.due_at,
        submissions: views,
    })
}
