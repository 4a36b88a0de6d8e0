use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::{Assignment, Submission};

#[derive(Debug, Error)]
pub enum CreateAssignmentError {
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum GetAssignmentError {
    #[error("Assignment not found.")]
    NotFound,

    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum QueryAssignmentsError {
    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum CreateSubmissionError {
    #[error("A submission for this assignment already exists.")]
    DuplicateSubmission,

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum QuerySubmissionsError {
    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum PutGradeError {
    #[error("Submission not found.")]
    SubmissionNotFound,

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[async_trait]
pub trait AssignmentsRepository {
    async fn create_assignment<'a>(&self, assignment: &'a Assignment) -> Result<&'a Uuid, CreateAssignmentError>;

    async fn get_assignment(&self, assignment_id: &Uuid) -> Result<Assignment, GetAssignmentError>;

    /// Assignments of one group, ordered by due date ascending.
    async fn assignments_for_group(&self, group_id: &Uuid) -> Result<Vec<Assignment>, QueryAssignmentsError>;
}

#[async_trait]
pub trait SubmissionsRepository {
    /// Inserts the submission, failing with `DuplicateSubmission` when a row
    /// for the same (assignment, student) pair exists. The write is
    /// conditional; two racing submissions cannot both land.
    async fn create_submission(&self, submission: &Submission) -> Result<(), CreateSubmissionError>;

    async fn submission(
        &self,
        assignment_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Submission>, QuerySubmissionsError>;

    async fn submissions_for_assignment(&self, assignment_id: &Uuid)
        -> Result<Vec<Submission>, QuerySubmissionsError>;

    /// Overwrites the grade and feedback text. `grade: None` clears the grade
    /// back to ungraded. Repeated identical calls land in the same state.
    async fn put_grade(
        &self,
        assignment_id: &Uuid,
        student_id: &Uuid,
        grade: Option<f64>,
        feedback: &str,
    ) -> Result<(), PutGradeError>;
}
