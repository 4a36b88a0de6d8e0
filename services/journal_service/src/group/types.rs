use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
#[serde(deny_unknown_fields)]
pub struct Group {
    #[builder(default = Uuid::new_v4())]
    pub group_id: Uuid,

    #[builder(setter(into))]
    pub name: String,

    #[builder(setter(into))]
    pub description: String,

    pub teacher_id: Uuid,

    /// Shared in cleartext with students out of band; looked up by exact
    /// match and unique across groups.
    #[builder(setter(into))]
    pub join_secret: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub project_prompt: Option<String>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
#[serde(deny_unknown_fields)]
pub struct Membership {
    pub group_id: Uuid,

    pub student_id: Uuid,

    #[builder(default = Utc::now())]
    pub joined_at: DateTime<Utc>,
}
