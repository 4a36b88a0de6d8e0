use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// A student-authored, timestamped journal post within a group.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
#[serde(deny_unknown_fields)]
pub struct LogEntry {
    pub group_id: Uuid,

    #[builder(default = Uuid::new_v4())]
    pub log_id: Uuid,

    pub author_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    #[builder(setter(into))]
    pub body: String,

    /// Upload-root-relative path of the attached media file, when present.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub media: Option<String>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

/// Teacher commentary attached to one log entry.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
#[serde(deny_unknown_fields)]
pub struct Feedback {
    pub log_id: Uuid,

    #[builder(default = Uuid::new_v4())]
    pub feedback_id: Uuid,

    pub teacher_id: Uuid,

    #[builder(setter(into))]
    pub body: String,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}
