use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use super::display_name;
use crate::group::{GetGroupError, GroupsRepository};
use crate::journal::{FeedbackRepository, GetEntryError, LogEntriesRepository};
use crate::session::Identity;
use crate::user_account::{AccountRole, AccountsRepository};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeLogOutput {
    pub log_id: Uuid,
    pub group_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub media: Option<String>,
    pub created_at: DateTime<Utc>,
    pub feedback: Vec<FeedbackView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedbackView {
    pub feedback_id: Uuid,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum DescribeLogError {
    #[error("Log entry not found.")]
    LogNotFound,

    #[error("You do not have access to this log entry.")]
    AccessDenied,
}

impl OperationError for DescribeLogError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::LogNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
        }
    }
}

/// Single-entry view. Students see only their own entries; the group's
/// teacher and admins see all of them.
pub(crate) async fn describe_log(
    identity: &Identity,
    groups: &impl GroupsRepository,
    entries: &impl LogEntriesRepository,
    feedback: &impl FeedbackRepository,
    accounts: &impl AccountsRepository,
    log_id: &Uuid,
) -> Result<DescribeLogOutput, EndpointError<DescribeLogError>> {
    let entry = entries.get_entry(log_id).await.map_err(|e| match e {
        GetEntryError::NotFound => EndpointError::operation(DescribeLogError::LogNotFound),
        e => {
            log::error!("Failed to get log entry: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let group = groups.get_group(&entry.group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => {
            log::error!("Log entry {} references missing group {}.", entry.log_id, entry.group_id);
            EndpointError::internal()
        }
        e => {
            log::error!("Failed to get group: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let allowed = identity.role == AccountRole::Admin
        || group.teacher_id == identity.account_id
        || entry.author_id == identity.account_id;
    if !allowed {
        return Err(EndpointError::operation(DescribeLogError::AccessDenied));
    }

    let internal = |e: &dyn std::fmt::Debug| {
        log::error!("Failed to assemble log view: {:?}", e);
        EndpointError::internal()
    };

    let author_name = display_name(accounts, &entry.author_id).await.map_err(|e| internal(&e))?;

    let mut feedback_views = Vec::new();
    for item in feedback.feedback_for_entry(log_id).await.map_err(|e| internal(&e))? {
        feedback_views.push(FeedbackView {
            teacher_name: display_name(accounts, &item.teacher_id).await.map_err(|e| internal(&e))?,
            feedback_id: item.feedback_id,
            teacher_id: item.teacher_id,
            body: item.body,
            created_at: item.created_at,
        });
    }

    Ok(DescribeLogOutput {
        log_id: entry.log_id,
        group_id: entry.group_id,
        author_id: entry.author_id,
        author_name,
        title: entry.title,
        body: entry.body,
        media: entry.media,
        created_at: entry.created_at,
        feedback: feedback_views,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use crate::journal::{Feedback, LogEntry};
    use crate::testing::{InMemoryAccounts, InMemoryFeedback, InMemoryGroups, InMemoryLogEntries};

    struct Fixture {
        groups: InMemoryGroups,
        entries: InMemoryLogEntries,
        feedback: InMemoryFeedback,
        accounts: InMemoryAccounts,
        teacher: Identity,
        author: Identity,
        entry: LogEntry,
    }

    async fn fixture() -> Fixture {
        let teacher = Identity::teacher();
        let author = Identity::student();
        let groups = InMemoryGroups::default();
        let group = Group::builder()
            .name("CS101")
            .description("Intro course")
            .teacher_id(teacher.account_id)
            .join_secret("abc123")
            .build();
        groups.create_group(&group).await.unwrap();
        let entries = InMemoryLogEntries::default();
        let entry = LogEntry::builder()
            .group_id(group.group_id)
            .author_id(author.account_id)
            .title("Week 1")
            .body("Set up the repository.")
            .build();
        entries.create_entry(&entry).await.unwrap();
        Fixture {
            groups,
            entries,
            feedback: InMemoryFeedback::default(),
            accounts: InMemoryAccounts::default(),
            teacher,
            author,
            entry,
        }
    }

    #[tokio::test]
    async fn author_reads_own_entry_with_feedback() {
        let f = fixture().await;
        f.feedback
            .add_feedback(
                &Feedback::builder()
                    .log_id(f.entry.log_id)
                    .teacher_id(f.teacher.account_id)
                    .body("Good start.")
                    .build(),
            )
            .await
            .unwrap();

        let output = describe_log(&f.author, &f.groups, &f.entries, &f.feedback, &f.accounts, &f.entry.log_id)
            .await
            .unwrap();
        assert_eq!(output.title, "Week 1");
        assert_eq!(output.feedback.len(), 1);
        assert_eq!(output.feedback[0].body, "Good start.");
    }

    #[tokio::test]
    async fn owning_teacher_reads_any_entry() {
        let f = fixture().await;
        let output = describe_log(&f.teacher, &f.groups, &f.entries, &f.feedback, &f.accounts, &f.entry.log_id)
            .await
            .unwrap();
        assert_eq!(output.author_id, f.author.account_id);
    }

    #[tokio::test]
    async fn other_student_is_refused() {
        let f = fixture().await;
        let other = Identity::student();

        let err = describe_log(&other, &f.groups, &f.entries, &f.feedback, &f.accounts, &f.entry.log_id)
            .await
            .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(DescribeLogError::AccessDenied)));
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let f = fixture().await;
        let err = describe_log(&f.teacher, &f.groups, &f.entries, &f.feedback, &f.accounts, &Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(DescribeLogError::LogNotFound)));
    }
}
