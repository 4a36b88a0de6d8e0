use chrono::Utc;
use http::StatusCode;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::OperationError;
use thiserror::Error;
use uuid::Uuid;

use super::display_name;
use crate::assignment::{AssignmentsRepository, SubmissionsRepository};
use crate::group::{has_access, GetGroupError, GroupsRepository, MembershipsRepository};
use crate::journal::{EntryOrder, LogEntriesRepository};
use crate::report::{pdf, GroupReport, ReportAssignment, ReportLog, ReportMember, RECENT_LOG_COUNT};
use crate::session::Identity;
use crate::user_account::AccountsRepository;

#[derive(Debug)]
pub(crate) struct GenerateReportOutput {
    pub filename: String,
    pub pdf_bytes: Vec<u8>,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub(crate) enum GenerateReportError {
    #[error("Group not found.")]
    GroupNotFound,

    #[error("You do not have access to this group.")]
    AccessDenied,
}

impl OperationError for GenerateReportError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::GroupNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
        }
    }
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub(crate) async fn generate_report(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    accounts: &impl AccountsRepository,
    entries: &impl LogEntriesRepository,
    assignments: &impl AssignmentsRepository,
    submissions: &impl SubmissionsRepository,
    group_id: &Uuid,
) -> Result<GenerateReportOutput, EndpointError<GenerateReportError>> {
    let report = build_report(
        identity,
        groups,
        memberships,
        accounts,
        entries,
        assignments,
        submissions,
        group_id,
    )
    .await?;

    let pdf_bytes = pdf::render(&report).map_err(|e| {
        log::error!("Failed to render report PDF: {:?}", e);
        EndpointError::internal()
    })?;

    Ok(GenerateReportOutput {
        filename: format!("report_{}.pdf", report.group_name.replace(' ', "_")),
        pdf_bytes,
    })
}

pub(crate) async fn build_report(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    accounts: &impl AccountsRepository,
    entries: &impl LogEntriesRepository,
    assignments: &impl AssignmentsRepository,
    submissions: &impl SubmissionsRepository,
    group_id: &Uuid,
) -> Result<GroupReport, EndpointError<GenerateReportError>> {
    let group = groups.get_group(group_id).await.map_err(|e| match e {
        GetGroupError::NotFound => EndpointError::operation(GenerateReportError::GroupNotFound),
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
        return Err(EndpointError::operation(GenerateReportError::AccessDenied));
    }

    let internal = |e: &dyn std::fmt::Debug| {
        log::error!("Failed to assemble report: {:?}", e);
        EndpointError::internal()
    };

    let teacher_name = display_name(accounts, &group.teacher_id).await.map_err(|e| internal(&e))?;

    let mut members = Vec::new();
    let roster = memberships.members_of_group(group_id).await.map_err(|e| internal(&e))?;
    for membership in &roster {
        members.push(ReportMember {
            full_name: display_name(accounts, &membership.student_id).await.map_err(|e| internal(&e))?,
            joined_at: membership.joined_at,
        });
    }

    let mut recent_logs = Vec::new();
    for entry in entries
        .entries_for_group(group_id, EntryOrder::NewestFirst)
        .await
        .map_err(|e| internal(&e))?
        .into_iter()
        .take(RECENT_LOG_COUNT)
    {
        recent_logs.push(ReportLog {
            author_name: display_name(accounts, &entry.author_id).await.map_err(|e| internal(&e))?,
            title: entry.title,
            body: entry.body,
            created_at: entry.created_at,
        });
    }

    let mut report_assignments = Vec::new();
    for assignment in assignments
        .assignments_for_group(group_id)
        .await
        .map_err(|e| internal(&e))?
    {
        let submitted = submissions
            .submissions_for_assignment(&assignment.assignment_id)
            .await
            .map_err(|e| internal(&e))?
            .len();
        report_assignments.push(ReportAssignment {
            title: assignment.title,
            due_at: assignment.due_at,
            submitted,
            total: roster.len(),
        });
    }

    Ok(GroupReport {
        group_name: group.name,
        description: group.description,
        project_prompt: group.project_prompt,
        teacher_name,
        generated_at: Utc::now(),
        members,
        recent_logs,
        assignments: report_assignments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{Assignment, Submission};
    use crate::group::{Group, Membership};
    use crate::journal::LogEntry;
    use crate::testing::{
        InMemoryAccounts, InMemoryAssignments, InMemoryGroups, InMemoryLogEntries, InMemoryMemberships,
        InMemorySubmissions,
    };

    struct Fixture {
        groups: InMemoryGroups,
        memberships: InMemoryMemberships,
        accounts: InMemoryAccounts,
        entries: InMemoryLogEntries,
        assignments: InMemoryAssignments,
        submissions: InMemorySubmissions,
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
            submissions: InMemorySubmissions::default(),
            teacher,
            group,
        }
    }

    #[tokio::test]
    async fn report_caps_logs_at_ten_newest() {
        let f = fixture().await;
        let author = Uuid::new_v4();
        for i in 0..12 {
            let entry = LogEntry::builder()
                .group_id(f.group.group_id)
                .author_id(author)
                .title(format!("Entry {}", i))
                .body("notes")
                .created_at(Utc::now() - chrono::Duration::hours(12 - i))
                .build();
            f.entries.create_entry(&entry).await.unwrap();
        }

        let report = build_report(
            &f.teacher,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &f.submissions,
            &f.group.group_id,
        )
        .await
        .unwrap();

        assert_eq!(report.recent_logs.len(), RECENT_LOG_COUNT);
        assert_eq!(report.recent_logs[0].title, "Entry 11");
    }

    #[tokio::test]
    async fn submission_ratio_counts_members() {
        let f = fixture().await;
        let students: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for student_id in &students {
            f.memberships
                .add_member(&Membership::builder().group_id(f.group.group_id).student_id(*student_id).build())
                .await
                .unwrap();
        }
        let assignment = Assignment::builder()
            .group_id(f.group.group_id)
            .teacher_id(f.teacher.account_id)
            .title("Homework 1")
            .description("Work")
            .due_at(Utc::now())
            .build();
        f.assignments.create_assignment(&assignment).await.unwrap();
        f.submissions
            .create_submission(
                &Submission::builder()
                    .assignment_id(assignment.assignment_id)
                    .student_id(students[0])
                    .file_path("submissions/solution.pdf")
                    .build(),
            )
            .await
            .unwrap();

        let report = build_report(
            &f.teacher,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &f.submissions,
            &f.group.group_id,
        )
        .await
        .unwrap();

        assert_eq!(report.assignments[0].ratio(), "1/3");
    }

    #[tokio::test]
    async fn non_member_cannot_generate() {
        let f = fixture().await;
        let stranger = Identity::student();

        let err = generate_report(
            &stranger,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &f.submissions,
            &f.group.group_id,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EndpointError::Operation(GenerateReportError::AccessDenied)));
    }

    #[tokio::test]
    async fn output_is_a_pdf_with_a_filename() {
        let f = fixture().await;
        let output = generate_report(
            &f.teacher,
            &f.groups,
            &f.memberships,
            &f.accounts,
            &f.entries,
            &f.assignments,
            &f.submissions,
            &f.group.group_id,
        )
        .await
        .unwrap();

        assert_eq!(output.filename, "report_CS101.pdf");
        assert!(output.pdf_bytes.starts_with(b"%PDF"));
    }
}
