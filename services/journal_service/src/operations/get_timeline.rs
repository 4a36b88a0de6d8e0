use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use crate::assignment::AssignmentsRepository;
use crate::group::{has_access, GetGroupError, GroupsRepository, MembershipsRepository};
use crate::journal::{EntryOrder, LogEntriesRepository};
use crate::session::Identity;

const DESCRIPTION_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetTimelineOutput {
    pub events: Vec<TimelineEvent>,
}

/// A point event on the group timeline, ready for a client-side renderer.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimelineEvent {
    pub id: String,
    pub content: String,
    pub start: DateTime<Utc>,
    pub kind: String,
    pub title: String,
    pub description: String,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum GetTimelineError {
    #[error("Group not found.")]
    GroupNotFound,

    #[error("You do not have access to this group.")]
    AccessDenied,
}

impl OperationError for GetTimelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::GroupNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
        }
    }
}

/// Merges journal entries (by creation time) and assignments (by due date)
/// into a single chronologically ascending event stream.
pub(crate) async fn get_timeline(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    entries: &impl LogEntriesRepository,
    assignments: &impl AssignmentsRepository,
    group_id: &Uuid,
) -> Result<GetTimelineOutput, EndpointError<GetTimelineError>> {
    let group = groups.get_group(group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => EndpointError::operation(GetTimelineError::GroupNotFound),
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
        return Err(EndpointError::operation(GetTimelineError::AccessDenied));
    }

    let internal = |e: &dyn std::fmt::Debug| {
        log::error!("Failed to assemble timeline: {:?}", e);
        EndpointError::internal()
    };

    let mut events = Vec::new();
    for entry in entries
        .entries_for_group(group_id, EntryOrder::OldestFirst)
        .await
        .map_err(|e| internal(&e))?
    {
        events.push(TimelineEvent {
            id: format!("log_{}", entry.log_id),
            content: entry.title.clone(),
            start: entry.created_at,
            kind: "log".to_owned(),
            title: entry.title,
            description: truncate(&entry.body),
        });
    }
    for assignment in assignments
        .assignments_for_group(group_id)
        .await
        .map_err(|e| internal(&e))?
    {
        events.push(TimelineEvent {
            id: format!("assignment_{}", assignment.assignment_id),
            content: assignment.title.clone(),
            start: assignment.due_at,
            kind: "assignment".to_owned(),
            title: assignment.title,
            description: truncate(&assignment.description),
        });
    }
    events.sort_by(|a, b| a.start.cmp(&b.start));

    Ok(GetTimelineOutput { events })
}

/// First 100 characters with an ellipsis; counted in characters so multibyte
/// text never splits.
fn truncate(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        text.to_owned()
    } else {
        let mut truncated: String = text.chars().take(DESCRIPTION_LIMIT).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::Assignment;
    use crate::group::Group;
    use crate::journal::LogEntry;
    use crate::testing::{InMemoryAssignments, InMemoryGroups, InMemoryLogEntries, InMemoryMemberships};

    struct Fixture {
        groups: InMemoryGroups,
        memberships: InMemoryMemberships,
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
            entries: InMemoryLogEntries::default(),
            assignments: InMemoryAssignments::default(),
            teacher,
            group,
        }
    }

    #[tokio::test]
    async fn events_are_merged_and_ascending() {
        let f = fixture().await;
        let base = Utc::now();
        let entry = LogEntry::builder()
            .group_id(f.group.group_id)
            .author_id(Uuid::new_v4())
            .title("Week 1")
            .body("notes")
            .created_at(base - chrono::Duration::days(2))
            .build();
        f.entries.create_entry(&entry).await.unwrap();
        let assignment = Assignment::builder()
            .group_id(f.group.group_id)
            .teacher_id(f.teacher.account_id)
            .title("Homework 1")
            .description("Work")
            .due_at(base - chrono::Duration::days(1))
            .build();
        f.assignments.create_assignment(&assignment).await.unwrap();
        let later_entry = LogEntry::builder()
            .group_id(f.group.group_id)
            .author_id(Uuid::new_v4())
            .title("Week 2")
            .body("more notes")
            .created_at(base)
            .build();
        f.entries.create_entry(&later_entry).await.unwrap();

        let output = get_timeline(&f.teacher, &f.groups, &f.memberships, &f.entries, &f.assignments, &f.group.group_id)
            .await
            .unwrap();

        let ids: Vec<_> = output.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                format!("log_{}", entry.log_id).as_str(),
                format!("assignment_{}", assignment.assignment_id).as_str(),
                format!("log_{}", later_entry.log_id).as_str(),
            ]
        );
        assert!(output.events.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[tokio::test]
    async fn long_descriptions_are_truncated() {
        let f = fixture().await;
        let entry = LogEntry::builder()
            .group_id(f.group.group_id)
            .author_id(Uuid::new_v4())
            .title("Week 1")
            .body("x".repeat(250))
            .build();
        f.entries.create_entry(&entry).await.unwrap();

        let output = get_timeline(&f.teacher, &f.groups, &f.memberships, &f.entries, &f.assignments, &f.group.group_id)
            .await
            .unwrap();
        let description = &output.events[0].description;
        assert_eq!(description.chars().count(), DESCRIPTION_LIMIT + 3);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate("short"), "short");
        let exactly_100 = "y".repeat(100);
        assert_eq!(truncate(&exactly_100), exactly_100);
    }

    #[tokio::test]
    async fn non_member_is_refused() {
        let f = fixture().await;
        let stranger = Identity::student();

        let err = get_timeline(&stranger, &f.groups, &f.memberships, &f.entries, &f.assignments, &f.group.group_id)
            .await
            .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(GetTimelineError::AccessDenied)));
    }
}
