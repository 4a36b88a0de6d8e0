pub mod ddb_repository;
pub mod repository;
pub mod types;

pub use repository::{
    AssignmentsRepository, CreateAssignmentError, CreateSubmissionError, GetAssignmentError, PutGradeError,
    QueryAssignmentsError, QuerySubmissionsError, SubmissionsRepository,
};
pub use types::{Assignment, Submission};
