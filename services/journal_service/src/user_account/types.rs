use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
#[serde(deny_unknown_fields)]
pub struct UserAccount {
    #[builder(default = Uuid::new_v4())]
    pub account_id: Uuid,

    #[builder(setter(into))]
    pub username: String,

    #[builder(setter(into))]
    pub email: String,

    #[builder(setter(into))]
    pub full_name: String,

    /// Argon2id hash of the account password; never the cleartext.
    #[serde(default)]
    #[builder(setter(into))]
    pub password: String,

    #[builder(default = AccountRole::Student)]
    pub role: AccountRole,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub avatar: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub contact_details: Option<String>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum AccountRole {
    Admin,
    Teacher,
    Student,
}

impl Display for AccountRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRole::Admin => write!(f, "admin"),
            AccountRole::Teacher => write!(f, "teacher"),
            AccountRole::Student => write!(f, "student"),
        }
    }
}

impl FromStr for AccountRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AccountRole::Admin),
            "teacher" => Ok(AccountRole::Teacher),
            "student" => Ok(AccountRole::Student),
            _ => Err(()),
        }
    }
}
