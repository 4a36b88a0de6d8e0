use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use common_macros::hash_map;
use serde::{Deserialize, Serialize};
use service_core::ddb::get_item::GetItemInput;
use service_core::ddb::put_item::PutItemInput;
use service_core::ddb::query::QueryInput;
use service_core::ddb::update_item::UpdateItemInput;
use uuid::Uuid;

use crate::assignment::{
    Assignment, AssignmentsRepository, CreateAssignmentError, CreateSubmissionError, GetAssignmentError,
    PutGradeError, QueryAssignmentsError, QuerySubmissionsError, Submission, SubmissionsRepository,
};
use crate::ddb_interop::{self, ThreadSafeDdbClient};

const QUERY_PAGE_LIMIT: i32 = 512;

pub struct DdbAssignmentsRepository<T: ThreadSafeDdbClient> {
    ddb: T,
    assignments_table_name: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssignmentIdIndexProjection {
    group_id: Uuid,
    assignment_id: Uuid,
}

impl<T: ThreadSafeDdbClient> DdbAssignmentsRepository<T> {
    pub fn new(ddb: T, assignments_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            assignments_table_name: assignments_table_name.into(),
        }
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> AssignmentsRepository for DdbAssignmentsRepository<T> {
    async fn create_assignment<'a>(&self, assignment: &'a Assignment) -> Result<&'a Uuid, CreateAssignmentError> {
        if assignment.title.is_empty() {
            return Err(CreateAssignmentError::Validation("Title is required."));
        }
        if assignment.description.is_empty() {
            return Err(CreateAssignmentError::Validation("Description is required."));
        }

        let item = ddb_interop::to_hashmap(&assignment).map_err(|e| CreateAssignmentError::Other(e.into()))?;
        let put_item_input = PutItemInput::builder()
            .table_name(self.assignments_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(AssignmentId)")
            .build();

        self.ddb
            .put_item(put_item_input)
            .await
            .map_err(|e| CreateAssignmentError::Other(e.into()))?;

        Ok(&assignment.assignment_id)
    }

    async fn get_assignment(&self, assignment_id: &Uuid) -> Result<Assignment, GetAssignmentError> {
        let query_input = QueryInput::builder()
            .index_name("AssignmentIdIndex")
            .table_name(self.assignments_table_name.as_str())
            .key_condition_expression("AssignmentId = :v")
            .select(Select::AllProjectedAttributes)
            .expression_attribute_values(Some(hash_map! {
                ":v".to_string() => AttributeValue::S(assignment_id.to_string()),
            }))
            .limit(1)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| GetAssignmentError::Other(e.into()))?;

        let item = output
            .items
            .ok_or_else(|| GetAssignmentError::Other("Malformed reply: missing items".into()))?
            .pop()
            .ok_or(GetAssignmentError::NotFound)?;
        let projection: AssignmentIdIndexProjection =
            ddb_interop::from_hashmap(item).map_err(GetAssignmentError::Serde)?;

        let get_item_input = GetItemInput::builder()
            .table_name(self.assignments_table_name.as_str())
            .key(hash_map! {
                "GroupId".to_string() => AttributeValue::S(projection.group_id.to_string()),
                "AssignmentId".to_string() => AttributeValue::S(projection.assignment_id.to_string()),
            })
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| GetAssignmentError::Other(e.into()))?;

        match output.item {
            None => Err(GetAssignmentError::NotFound),
            Some(item) => ddb_interop::from_hashmap(item).map_err(GetAssignmentError::Serde),
        }
    }

    async fn assignments_for_group(&self, group_id: &Uuid) -> Result<Vec<Assignment>, QueryAssignmentsError> {
        let query_input = QueryInput::builder()
            .table_name(self.assignments_table_name.as_str())
            .key_condition_expression("GroupId = :v")
            .expression_attribute_values(Some(hash_map! {
                ":v".to_string() => AttributeValue::S(group_id.to_string()),
            }))
            .limit(QUERY_PAGE_LIMIT)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| QueryAssignmentsError::Other(e.into()))?;

        let mut assignments = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| ddb_interop::from_hashmap(item).map_err(QueryAssignmentsError::Serde))
            .collect::<Result<Vec<Assignment>, _>>()?;
        assignments.sort_by(|a, b| a.due_at.cmp(&b.due_at));
        Ok(assignments)
    }
}

pub struct DdbSubmissionsRepository<T: ThreadSafeDdbClient> {
    ddb: T,
    submissions_table_name: String,
}

impl<T: ThreadSafeDdbClient> DdbSubmissionsRepository<T> {
    pub fn new(ddb: T, submissions_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            submissions_table_name: submissions_table_name.into(),
        }
    }

    fn submission_key(assignment_id: &Uuid, student_id: &Uuid) -> std::collections::HashMap<String, AttributeValue> {
        hash_map! {
            "AssignmentId".to_string() => AttributeValue::S(assignment_id.to_string()),
            "StudentId".to_string() => AttributeValue::S(student_id.to_string()),
        }
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> SubmissionsRepository for DdbSubmissionsRepository<T> {
    async fn create_submission(&self, submission: &Submission) -> Result<(), CreateSubmissionError> {
        let item = ddb_interop::to_hashmap(&submission).map_err(|e| CreateSubmissionError::Other(e.into()))?;
        let put_item_input = PutItemInput::builder()
            .table_name(self.submissions_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(AssignmentId) and attribute_not_exists(StudentId)")
            .build();

        self.ddb.put_item(put_item_input).await.map_err(|err| match &err {
            SdkError::ServiceError(service_err) if service_err.err().is_conditional_check_failed_exception() => {
                CreateSubmissionError::DuplicateSubmission
            }
            _ => CreateSubmissionError::Other(err.into()),
        })?;

        Ok(())
    }

    async fn submission(
        &self,
        assignment_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Submission>, QuerySubmissionsError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.submissions_table_name.as_str())
            .key(Self::submission_key(assignment_id, student_id))
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| QuerySubmissionsError::Other(e.into()))?;

        output
            .item
            .map(|item| ddb_interop::from_hashmap(item).map_err(QuerySubmissionsError::Serde))
            .transpose()
    }

    async fn submissions_for_assignment(
        &self,
        assignment_id: &Uuid,
    ) -> Result<Vec<Submission>, QuerySubmissionsError> {
        let query_input = QueryInput::builder()
            .table_name(self.submissions_table_name.as_str())
            .key_condition_expression("AssignmentId = :v")
            .expression_attribute_values(Some(hash_map! {
                ":v".to_string() => AttributeValue::S(assignment_id.to_string()),
            }))
            .limit(QUERY_PAGE_LIMIT)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| QuerySubmissionsError::Other(e.into()))?;

        let mut submissions = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| ddb_interop::from_hashmap(item).map_err(QuerySubmissionsError::Serde))
            .collect::<Result<Vec<Submission>, _>>()?;
        submissions.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(submissions)
    }

    async fn put_grade(
        &self,
        assignment_id: &Uuid,
        student_id: &Uuid,
        grade: Option<f64>,
        feedback: &str,
    ) -> Result<(), PutGradeError> {
        let mut values = hash_map! {
            ":feedback".to_string() => AttributeValue::S(feedback.to_owned()),
        };
        let update_expression = match grade {
            Some(value) => {
                values.insert(":grade".to_string(), AttributeValue::N(value.to_string()));
                "SET Feedback = :feedback, Grade = :grade"
            }
            None => "SET Feedback = :feedback REMOVE Grade",
        };

        let update_item_input = UpdateItemInput::builder()
            .table_name(self.submissions_table_name.as_str())
            .key(Self::submission_key(assignment_id, student_id))
            .update_expression(update_expression)
            .condition_expression("attribute_exists(AssignmentId)")
            .expression_attribute_values(values)
            .build();

        self.ddb.update_item(update_item_input).await.map_err(|err| match &err {
            SdkError::ServiceError(service_err) if service_err.err().is_conditional_check_failed_exception() => {
                PutGradeError::SubmissionNotFound
            }
            _ => PutGradeError::Other(err.into()),
        })?;

        Ok(())
    }
}
