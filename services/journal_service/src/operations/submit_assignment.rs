use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::assignment::{AssignmentsRepository, CreateSubmissionError, GetAssignmentError, Submission, SubmissionsRepository};
use crate::group::MembershipsRepository;
use crate::session::Identity;
use crate::uploads::{FileStore, UploadCategory, UploadError, UploadedFile};

#[derive(Debug, TypedBuilder)]
pub(crate) struct SubmitAssignmentInput {
    pub assignment_id: Uuid,

    #[builder(default)]
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitAssignmentOutput {
    pub assignment_id: Uuid,
    pub file_path: String,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum SubmitAssignmentError {
    #[error("Assignment not found.")]
    AssignmentNotFound,

    #[error("Only group members can submit.")]
    NotAMember,

    #[error("You have already submitted this assignment.")]
    DuplicateSubmission,

    #[error("No file was provided.")]
    NoFile,

    #[error("This file type is not permitted.")]
    UnsupportedFileType,
}

impl OperationError for SubmitAssignmentError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AssignmentNotFound => StatusCode::NOT_FOUND,
            Self::NotAMember => StatusCode::FORBIDDEN,
            Self::DuplicateSubmission => StatusCode::CONFLICT,
            Self::NoFile | Self::UnsupportedFileType => StatusCode::BAD_REQUEST,
        }
    }
}

/// One-shot submission. The stored file is only kept when the submission row
/// lands, so a duplicate attempt leaves no stray upload behind.
pub(crate) async fn submit_assignment(
    identity: &Identity,
    assignments: &impl AssignmentsRepository,
    memberships: &impl MembershipsRepository,
    submissions: &impl SubmissionsRepository,
    files: &FileStore,
    input: SubmitAssignmentInput,
) -> Result<SubmitAssignmentOutput, EndpointError<SubmitAssignmentError>> {
    let assignment = assignments
        .get_assignment(&input.assignment_id)
        .await
        .map_err(|e| match e {
            GetAssignmentError::NotFound => EndpointError::operation(SubmitAssignmentError::AssignmentNotFound),
            e => {
                log::error!("Failed to get assignment: {:?}", e);
                EndpointError::internal()
            }
        })?;

    let is_member = memberships
        .membership(&assignment.group_id, &identity.account_id)
        .await
        .map_err(|e| {
            log::error!("Failed to check membership: {:?}", e);
            EndpointError::internal()
        })?
        .is_some();
    if !is_member {
        return Err(EndpointError::operation(SubmitAssignmentError::NotAMember));
    }

    let file = input
        .file
        .as_ref()
        .filter(|f| !f.filename.is_empty())
        .ok_or_else(|| EndpointError::operation(SubmitAssignmentError::NoFile))?;
    let stored = files
        .save(UploadCategory::Submissions, &file.filename, &file.contents)
        .map_err(|e| match e {
            UploadError::NoFile => EndpointError::operation(SubmitAssignmentError::NoFile),
            UploadError::UnsupportedType => EndpointError::operation(SubmitAssignmentError::UnsupportedFileType),
            UploadError::Io(e) => {
                log::error!("Failed to store submission file: {:?}", e);
                EndpointError::internal()
            }
        })?;

    let submission = Submission::builder()
        .assignment_id(assignment.assignment_id)
        .student_id(identity.account_id)
        .file_path(stored.relative_path())
        .build();
    submissions.create_submission(&submission).await.map_err(|e| match e {
        CreateSubmissionError::DuplicateSubmission => {
            EndpointError::operation(SubmitAssignmentError::DuplicateSubmission)
        }
        CreateSubmissionError::Other(e) => {
            log::error!("Failed to create submission: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let file_path = stored.persist();

    Ok(SubmitAssignmentOutput {
        assignment_id: assignment.assignment_id,
        file_path,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::assignment::Assignment;
    use crate::group::Membership;
    use crate::testing::{InMemoryAssignments, InMemoryMemberships, InMemorySubmissions};

    struct Fixture {
        assignments: InMemoryAssignments,
        memberships: InMemoryMemberships,
        submissions: InMemorySubmissions,
        student: Identity,
        assignment: Assignment,
    }

    async fn fixture() -> Fixture {
        let student = Identity::student();
        let group_id = Uuid::new_v4();
        let assignments = InMemoryAssignments::default();
        let assignment = Assignment::builder()
            .group_id(group_id)
            .teacher_id(Uuid::new_v4())
            .title("Homework 1")
            .description("Implement a parser.")
            .due_at(Utc::now() + chrono::Duration::days(7))
            .build();
        assignments.create_assignment(&assignment).await.unwrap();
        let memberships = InMemoryMemberships::default();
        memberships
            .add_member(&Membership::builder().group_id(group_id).student_id(student.account_id).build())
            .await
            .unwrap();
        Fixture {
            assignments,
            memberships,
            submissions: InMemorySubmissions::default(),
            student,
            assignment,
        }
    }

    fn file_store() -> FileStore {
        FileStore::new(std::env::temp_dir().join(format!("submit-test-{}", Uuid::new_v4().simple())))
    }

    fn input(assignment_id: Uuid, filename: &str) -> SubmitAssignmentInput {
        SubmitAssignmentInput::builder()
            .assignment_id(assignment_id)
            .file(Some(UploadedFile {
                filename: filename.to_owned(),
                contents: b"solution".to_vec(),
            }))
            .build()
    }

    #[tokio::test]
    async fn member_submits_once() {
        let f = fixture().await;
        let output = submit_assignment(
            &f.student,
            &f.assignments,
            &f.memberships,
            &f.submissions,
            &file_store(),
            input(f.assignment.assignment_id, "solution.pdf"),
        )
        .await
        .unwrap();

        let stored = f
            .submissions
            .submission(&f.assignment.assignment_id, &f.student.account_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.file_path, output.file_path);
        assert!(stored.grade.is_none());
    }

    #[tokio::test]
    async fn second_submission_is_refused() {
        let f = fixture().await;
        let files = file_store();
        submit_assignment(
            &f.student,
            &f.assignments,
            &f.memberships,
            &f.submissions,
            &files,
            input(f.assignment.assignment_id, "solution.pdf"),
        )
        .await
        .unwrap();

        let err = submit_assignment(
            &f.student,
            &f.assignments,
            &f.memberships,
            &f.submissions,
            &files,
            input(f.assignment.assignment_id, "solution-v2.pdf"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(SubmitAssignmentError::DuplicateSubmission)));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_file_is_refused() {
        let f = fixture().await;
        let err = submit_assignment(
            &f.student,
            &f.assignments,
            &f.memberships,
            &f.submissions,
            &file_store(),
            SubmitAssignmentInput::builder().assignment_id(f.assignment.assignment_id).build(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(SubmitAssignmentError::NoFile)));
    }

    #[tokio::test]
    async fn non_member_is_refused() {
        let f = fixture().await;
        let stranger = Identity::student();
        let err = submit_assignment(
            &stranger,
            &f.assignments,
            &f.memberships,
            &f.submissions,
            &file_store(),
            input(f.assignment.assignment_id, "solution.pdf"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(SubmitAssignmentError::NotAMember)));
    }

    #[tokio::test]
    async fn bad_file_type_is_refused() {
        let f = fixture().await;
        let err = submit_assignment(
            &f.student,
            &f.assignments,
            &f.memberships,
            &f.submissions,
            &file_store(),
            input(f.assignment.assignment_id, "solution.exe"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(SubmitAssignmentError::UnsupportedFileType)));
    }
}
