use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use crate::assignment::{AssignmentsRepository, GetAssignmentError, PutGradeError, SubmissionsRepository};
use crate::session::Identity;
use crate::user_account::AccountRole;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub(crate) struct GradeSubmissionInput {
    pub student_id: Uuid,

    /// A number, a numeric string, or empty/null to clear the grade.
    #[serde(default)]
    pub grade: Value,

    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GradeSubmissionOutput {
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub grade: Option<f64>,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum GradeSubmissionError {
    #[error("Assignment not found.")]
    AssignmentNotFound,

    #[error("Only the group's teacher can grade submissions.")]
    NotOwner,

    #[error("Submission not found.")]
    SubmissionNotFound,

    #[error("Grade must be a number between 0 and 100.")]
    InvalidGrade,
}

impl OperationError for GradeSubmissionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AssignmentNotFound | Self::SubmissionNotFound => StatusCode::NOT_FOUND,
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::InvalidGrade => StatusCode::BAD_REQUEST,
        }
    }
}

/// Writes the grade and feedback for one submission. Clearing and repeated
/// identical writes are both fine; the update overwrites in place.
pub(crate) async fn grade_submission(
    identity: &Identity,
    assignments: &impl AssignmentsRepository,
    submissions: &impl SubmissionsRepository,
    assignment_id: &Uuid,
    input: GradeSubmissionInput,
) -> Result<GradeSubmissionOutput, EndpointError<GradeSubmissionError>> {
    let assignment = assignments.get_assignment(assignment_id).await.map_err(|e| match e {
        GetAssignmentError::NotFound => EndpointError::operation(GradeSubmissionError::AssignmentNotFound),
        e => {
            log::error!("Failed to get assignment: {:?}", e);
            EndpointError::internal()
        }
    })?;

    if identity.role != AccountRole::Admin && assignment.teacher_id != identity.account_id {
        return Err(EndpointError::operation(GradeSubmissionError::NotOwner));
    }

    let grade = parse_grade(&input.grade)
        .map_err(|_| EndpointError::operation(GradeSubmissionError::InvalidGrade))?;
    if let Some(value) = grade {
        if !(0.0..=100.0).contains(&value) {
            return Err(EndpointError::operation(GradeSubmissionError::InvalidGrade));
        }
    }

    submissions
        .put_grade(assignment_id, &input.student_id, grade, input.feedback.trim())
        .await
        .map_err(|e| match e {
            PutGradeError::SubmissionNotFound => EndpointError::operation(GradeSubmissionError::SubmissionNotFound),
            PutGradeError::Other(e) => {
                log::error!("Failed to write grade: {:?}", e);
                EndpointError::internal()
            }
        })?;

    Ok(GradeSubmissionOutput {
        assignment_id: *assignment_id,
        student_id: input.student_id,
        grade,
    })
}

/// Empty input clears the grade; anything else must parse as a number.
fn parse_grade(raw: &Value) -> Result<Option<f64>, ()> {
    match raw {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or(()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| ()),
        _ => Err(()),
    }
}
