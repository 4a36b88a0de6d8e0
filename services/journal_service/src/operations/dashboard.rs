use chrono::{DateTime, Utc};
use serde::Serialize;
use service_core::endpoint_error::EndpointError;
use service_core::operation_error::Infallible;
use uuid::Uuid;

use crate::assignment::{AssignmentsRepository, SubmissionsRepository};
use crate::group::{GroupsRepository, MembershipsRepository};
use crate::session::Identity;
use crate::user_account::AccountRole;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardOutput {
    pub role: String,
    pub groups: Vec<DashboardGroup>,
    /// Assignments due in the future that the student has not submitted.
    /// Always empty for teachers.
    pub pending_assignments: Vec<PendingAssignment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardGroup {
    pub group_id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PendingAssignment {
    pub assignment_id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub title: String,
    pub due_at: DateTime<Utc>,
}

/// Role-dependent landing payload: teachers get the groups they own,
/// students get their enrolled groups plus outstanding work.
pub(crate) async fn dashboard(
    identity: &Identity,
    groups: &impl GroupsRepository,
    memberships: &impl MembershipsRepository,
    assignments: &impl AssignmentsRepository,
    submissions: &impl SubmissionsRepository,
) -> Result<DashboardOutput, EndpointError<Infallible>> {
    let internal = |e: &dyn std::fmt::Debug| {
        log::error!("Failed to assemble dashboard: {:?}", e);
        EndpointError::internal()
    };

    if identity.role != AccountRole::Student {
        let owned = groups
            .groups_for_teacher(&identity.account_id)
            .await
            .map_err(|e| internal(&e))?;
        return Ok(DashboardOutput {
            role: identity.role.to_string(),
            groups: owned
                .into_iter()
                .map(|g| DashboardGroup {
                    group_id: g.group_id,
                    name: g.name,
                    description: g.description,
                })
                .collect(),
            pending_assignments: Vec::new(),
        });
    }

    let now = Utc::now();
    let mut dashboard_groups = Vec::new();
    let mut pending = Vec::new();
    for membership in memberships
        .groups_for_student(&identity.account_id)
        .await
        .map_err(|e| internal(&e))?
    {
        let group = match groups.get_group(&membership.group_id).await {
            Ok(group) => group,
            Err(e) => {
                log::warn!("Skipping dangling membership {}: {:?}", membership.group_id, e);
                continue;
            }
        };

        for assignment in assignments
            .assignments_for_group(&group.group_id)
            .await
            .map_err(|e| internal(&e))?
        {
            if assignment.due_at <= now {
                continue;
            }
            let submitted = submissions
                .submission(&assignment.assignment_id, &identity.account_id)
                .await
                .map_err(|e| internal(&e))?
                .is_some();
            if !submitted {
                pending.push(PendingAssignment {
                    assignment_id: assignment.assignment_id,
                    group_id: group.group_id,
                    group_name: group.name.clone(),
                    title: assignment.title,
                    due_at: assignment.due_at,
                });
            }
        }

        dashboard_groups.push(DashboardGroup {
            group_id: group.group_id,
            name: group.name,
            description: group.description,
        });
    }
    pending.sort_by(|a, b| a.due_at.cmp(&b.due_at));

    Ok(DashboardOutput {
        role: identity.role.to_string(),
        groups: dashboard_groups,
        pending_assignments: pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{Assignment, Submission};
    use crate::group::{Group, Membership};
    use crate::testing::{InMemoryAssignments, InMemoryGroups, InMemoryMemberships, InMemorySubmissions};

    struct Fixture {
        groups: InMemoryGroups,
        memberships: InMemoryMemberships,
        assignments: InMemoryAssignments,
        submissions: InMemorySubmissions,
    }

    fn fixture() -> Fixture {
        Fixture {
            groups: InMemoryGroups::default(),
            memberships: InMemoryMemberships::default(),
            assignments: InMemoryAssignments::default(),
            submissions: InMemorySubmissions::default(),
        }
    }

    async fn seed_group(f: &Fixture, teacher_id: Uuid, secret: &str) -> Group {
        let group = Group::builder()
            .name(format!("Group {}", secret))
            .description("A group")
            .teacher_id(teacher_id)
            .join_secret(secret)
            .build();
        f.groups.create_group(&group).await.unwrap();
        group
    }

    async fn seed_assignment(f: &Fixture, group: &Group, due_in_days: i64) -> Assignment {
        let assignment = Assignment::builder()
            .group_id(group.group_id)
            .teacher_id(group.teacher_id)
            .title("Homework")
            .description("Work")
            .due_at(Utc::now() + chrono::Duration::days(due_in_days))
            .build();
        f.assignments.create_assignment(&assignment).await.unwrap();
        assignment
    }

    #[tokio::test]
    async fn teacher_sees_owned_groups_only() {
        let teacher = Identity::teacher();
        let f = fixture();
        seed_group(&f, teacher.account_id, "one").await;
        seed_group(&f, Uuid::new_v4(), "two").await;

        let output = dashboard(&teacher, &f.groups, &f.memberships, &f.assignments, &f.submissions)
            .await
            .unwrap();
        assert_eq!(output.groups.len(), 1);
        assert!(output.pending_assignments.is_empty());
    }

    #[tokio::test]
    async fn student_sees_pending_work() {
        let student = Identity::student();
        let f = fixture();
        let group = seed_group(&f, Uuid::new_v4(), "one").await;
        f.memberships
            .add_member(&Membership::builder().group_id(group.group_id).student_id(student.account_id).build())
            .await
            .unwrap();
        let upcoming = seed_assignment(&f, &group, 7).await;
        seed_assignment(&f, &group, -1).await;

        let output = dashboard(&student, &f.groups, &f.memberships, &f.assignments, &f.submissions)
            .await
            .unwrap();
        assert_eq!(output.groups.len(), 1);
        // The overdue assignment does not count as pending.
        assert_eq!(output.pending_assignments.len(), 1);
        assert_eq!(output.pending_assignments[0].assignment_id, upcoming.assignment_id);
    }

    #[tokio::test]
    async fn submitted_assignment_is_not_pending() {
        let student = Identity::student();
        let f = fixture();
        let group = seed_group(&f, Uuid::new_v4(), "one").await;
        f.memberships
            .add_member(&Membership::builder().group_id(group.group_id).student_id(student.account_id).build())
            .await
            .unwrap();
        let assignment = seed_assignment(&f, &group, 7).await;
        f.submissions
            .create_submission(
                &Submission::builder()
                    .assignment_id(assignment.assignment_id)
                    .student_id(student.account_id)
                    .file_path("submissions/solution.pdf")
                    .build(),
            )
            .await
            .unwrap();

        let output = dashboard(&student, &f.groups, &f.memberships, &f.assignments, &f.submissions)
            .await
            .unwrap();
        assert!(output.pending_assignments.is_empty());
    }
}
