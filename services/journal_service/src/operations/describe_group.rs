use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use super::display_name;
use crate::assignment::AssignmentsRepository;
use crate::group::{has_access, GetGroupError, GroupsRepository, MembershipsRepository};
use crate::journal::{EntryOrder, LogEntriesRepository};
use crate::session::Identity;
use crate::user_account::AccountsRepository;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeGroupOutput {
    pub group_id: Uuid,
    pub name: String,
    pub description: String,
    pub project_prompt: Option<String>,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub members: Vec<MemberView>,
    pub log_entries: Vec<EntryView>,
    pub assignments: Vec<AssignmentView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MemberView {
    pub student_id: Uuid,
    pub full_name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryView {
    pub log_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub media: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignmentView {
    pub assignment_id: Uuid,
    pub title: String,
    pub description: String,
    pub question_file: Option<String>,
    pub due_at: DateTime<Utc>,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum DescribeGroupError {
    #[error("Group not found.")]
    GroupNotFound,

    #[error("You do not have access to this group.")]
    AccessDenied,
}

impl OperationError for DescribeGroupError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::GroupNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
        }
    }
}

/// The group page payload: metadata, roster, journal entries newest first
/// and assignments by due date.
pub(crate) async fn describe_group(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    accounts: &impl AccountsRepository,
    entries: &impl LogEntriesRepository,
    assignments: &impl AssignmentsRepository,
    group_id: &Uuid,
) -> Result<DescribeGroupOutput, EndpointError<DescribeGroupError>> {
    let group = groups.get_group(group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => EndpointError::operation(DescribeGroupError::GroupNotFound),
        e => {
            log::error!("Failed to get group: {:?}", e);
            EndpointError::internal()
        }
    })?;

    let allowed = has_access(identity, &group, memberships).await.map_err(|e| {
        log::error!("Failed to check group access: {:?}", e);
        EndpointError::internal()
    })?;
    if !allowed {
        return Err(EndpointError::operation(DescribeGroupError::AccessDenied));
    }

    let internal = |e: &dyn std::fmt::Debug| {
        log::error!("Failed to assemble group view: {:?}", e);
        EndpointError::internal()
    };

    let teacher_name = display_name(accounts, &group.teacher_id).await.map_err(|e| internal(&e))?;

    let mut members = Vec::new();
    for membership in memberships.members_of_group(group_id).await.map_err(|e| internal(&e))? {
        members.push(MemberView {
            student_id: membership.student_id,
            full_name: display_name(accounts, &membership.student_id).await.map_err(|e| internal(&e))?,
            joined_at: membership.joined_at,
        });
    }

    let mut log_entries = Vec::new();
    for entry in entries
        .entries_for_group(group_id, EntryOrder::NewestFirst)
        .await
        .map_err(|e| internal(&e))?
    {
        log_entries.push(EntryView {
            author_name: display_name(accounts, &entry.author_id).await.map_err(|e| internal(&e))?,
            log_id: entry.log_id,
            author_id: entry.author_id,
            title: entry.title,
            body: entry.body,
            media: entry.media,
            created_at: entry.created_at,
        });
    }

    let assignments = assignments
        .assignments_for_group(group_id)
        .await
        .map_err(|e| internal(&e))?
        .into_iter()
        .map(|a| AssignmentView {
            assignment_id: a.assignment_id,
            title: a.title,
            description: a.description,
            question_file: a.question_file,
            due_at: a.due_at,
        })
        .collect();

    Ok(DescribeGroupOutput {
        group_id: group.group_id,
        name: group.name,
        description: group.description,
        project_prompt: group.project_prompt,
        teacher_id: group.teacher_id,
        teacher_name,
        members,
        log_entries,
        assignments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Group, Membership};
    use crate::journal::LogEntry;
    use crate::testing::{
        InMemoryAccounts, InMemoryAssignments, InMemoryGroups, InMemoryLogEntries, InMemoryMemberships,
    };
    use crate::user_account::{AccountRole, UserAccount};

    struct Fixture {
        groups: InMemoryGroups,
        memberships: InMemoryMemberships,
        accounts: InMemoryAccounts,
        entries: InMemoryLogEntries,
        assignments: InMemoryAssignments,
        teacher: Identity,
        group: Group,
    }

    async fn fixture() -> Fixture {
        let teacher = Identity::teacher();
        let groups = InMemoryGroups::default();
        let group = Group::builder()
            .name("CS101")
            .description("Intro course")
            .teacher_id(teacher.account_id)
            .join_secret("abc123")
            .build();
        groups.create_group(&group).await.unwrap();
        Fixture {
            groups,
            memberships: InMemoryMemberships::default(),
            accounts: InMemoryAccounts::default(),
            entries: InMemoryLogEntries::default(),
            assignments: InMemoryAssignments::default(),
            teacher,
            group,
        }
    }

    #[tokio::test]
    async fn entries_come_back_newest_first() {
        let f = fixture().await;
        let student = Identity::student();
        f.memberships
            .add_member(&Membership::builder().group_id(f.group.group_id).student_id(student.account_id).build())
            .await
            .unwrap();
        for (title, offset) in [("first", 2), ("second", 1)] {
            let entry = LogEntry::builder()
                .group_id(f.group.group_id)
                .author_id(student.account_id)
                .title(title)
                .body("work notes")
                .created_at(Utc::now() - chrono::Duration::hours(offset))
                .build();
            f.entries.create_entry(&entry).await.unwrap();
        }

        let output = describe_group(
            &f.teacher,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &f.group.group_id,
        )
        .await
        .unwrap();

        let titles: Vec<_> = output.log_entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
        assert_eq!(output.members.len(), 1);
    }

    #[tokio::test]
    async fn non_member_is_refused() {
        let f = fixture().await;
        let stranger = Identity::student();

        let err = describe_group(
            &stranger,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &f.group.group_id,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(DescribeGroupError::AccessDenied)));
    }

    #[tokio::test]
    async fn missing_group_is_not_found() {
        let f = fixture().await;

        let err = describe_group(
            &f.teacher,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(DescribeGroupError::GroupNotFound)));
    }

    #[tokio::test]
    async fn member_names_are_resolved() {
        let f = fixture().await;
        let account = UserAccount::builder()
            .username("sbrown")
            .email("sbrown@example.com")
            .full_name("Sam Brown")
            .password("hash")
            .role(AccountRole::Student)
            .build();
        f.accounts.create_account(&account).await.unwrap();
        f.memberships
            .add_member(&Membership::builder().group_id(f.group.group_id).student_id(account.account_id).build())
            .await
            .unwrap();

        let output = describe_group(
            &f.teacher,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &f.group.group_id,
        )
        .await
        .unwrap();
        assert_eq!(output.members[0].full_name, "Sam Brown");
        // The teacher account is not seeded, so its name falls back.
        assert_eq!(output.teacher_name, "Unknown");
    }
}
