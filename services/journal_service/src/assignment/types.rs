use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// A teacher-posted task with a due date, attached to a group.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
#[serde(deny_unknown_fields)]
pub struct Assignment {
    pub group_id: Uuid,

    #[builder(default = Uuid::new_v4())]
    pub assignment_id: Uuid,

    pub teacher_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    #[builder(setter(into))]
    pub description: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub question_file: Option<String>,

    pub due_at: DateTime<Utc>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

/// A student's one-time file response to an assignment. The grade and the
/// feedback text are the only fields ever mutated after creation.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
#[serde(deny_unknown_fields)]
pub struct Submission {
    pub assignment_id: Uuid,

    pub student_id: Uuid,

    #[builder(setter(into))]
    pub file_path: String,

    #[builder(default = Utc::now())]
    pub submitted_at: DateTime<Utc>,

    /// `None` means ungraded. Range-checked to [0, 100] before any write.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub grade: Option<f64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub feedback: Option<String>,
}
