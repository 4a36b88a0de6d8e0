//! In-memory repository fakes mirroring the conditional-write semantics of
//! the DynamoDB implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::assignment::{
    Assignment, AssignmentsRepository, CreateAssignmentError, CreateSubmissionError, GetAssignmentError,
    PutGradeError, QueryAssignmentsError, QuerySubmissionsError, Submission, SubmissionsRepository,
};
use crate::group::{
    AddMemberError, CreateGroupError, GetGroupError, Group, GroupsRepository, Membership,
    MembershipQueryError, MembershipsRepository,
};
use crate::journal::{
    AddFeedbackError, CreateEntryError, EntryOrder, Feedback, FeedbackRepository, GetEntryError, LogEntriesRepository,
    LogEntry, QueryEntriesError,
};
use crate::user_account::{
    AccountLookup, AccountsRepository, CreateAccountError, GetAccountError, ProfileUpdate, UpdateAccountError,
    UserAccount,
};

#[derive(Default)]
pub(crate) struct InMemoryAccounts {
    accounts: Mutex<Vec<UserAccount>>,
}

#[async_trait]
impl AccountsRepository for InMemoryAccounts {
    async fn create_account<'a>(&self, account: &'a UserAccount) -> Result<&'a Uuid, CreateAccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.username == account.username) {
            return Err(CreateAccountError::DuplicateUsername);
        }
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(CreateAccountError::DuplicateEmail);
        }
        accounts.push(account.clone());
        Ok(&account.account_id)
    }

    async fn get_account(&self, lookup: &AccountLookup) -> Result<UserAccount, GetAccountError> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| match lookup {
                AccountLookup::ById(id) => &a.account_id == id,
                AccountLookup::ByUsername(username) => &a.username == username,
                AccountLookup::ByEmail(email) => &a.email == email,
            })
            .cloned()
            .ok_or(GetAccountError::NotFound)
    }

    async fn update_profile(&self, account_id: &Uuid, update: &ProfileUpdate) -> Result<(), UpdateAccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| &a.account_id == account_id)
            .ok_or(UpdateAccountError::NotFound)?;
        account.full_name = update.full_name.clone();
        account.email = update.email.clone();
        account.contact_details = update.contact_details.clone();
        if let Some(avatar) = &update.avatar {
            account.avatar = Some(avatar.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryGroups {
    groups: Mutex<Vec<Group>>,
}

#[async_trait]
impl GroupsRepository for InMemoryGroups {
    async fn create_group<'a>(&self, group: &'a Group) -> Result<&'a Uuid, CreateGroupError> {
        let mut groups = self.groups.lock().unwrap();
        if groups.iter().any(|g| g.join_secret == group.join_secret) {
            return Err(CreateGroupError::DuplicateJoinSecret);
        }
        groups.push(group.clone());
        Ok(&group.group_id)
    }

    async fn get_group(&self, group_id: &Uuid) -> Result<Group, GetGroupError> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| &g.group_id == group_id)
            .cloned()
            .ok_or(GetGroupError::NotFound)
    }

    async fn group_by_join_secret(&self, join_secret: &str) -> Result<Group, GetGroupError> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.join_secret == join_secret)
            .cloned()
            .ok_or(GetGroupError::NotFound)
    }

    async fn groups_for_teacher(&self, teacher_id: &Uuid) -> Result<Vec<Group>, MembershipQueryError> {
        let mut groups: Vec<_> = self
            .groups
            .lock()
            .unwrap()
            .iter()
            .filter(|g| &g.teacher_id == teacher_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryMemberships {
    memberships: Mutex<Vec<Membership>>,
}

#[async_trait]
impl MembershipsRepository for InMemoryMemberships {
    async fn add_member(&self, membership: &Membership) -> Result<(), AddMemberError> {
        let mut memberships = self.memberships.lock().unwrap();
        if memberships
            .iter()
            .any(|m| m.group_id == membership.group_id && m.student_id == membership.student_id)
        {
            return Err(AddMemberError::AlreadyMember);
        }
        memberships.push(membership.clone());
        Ok(())
    }

    async fn membership(
        &self,
        group_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Membership>, MembershipQueryError> {
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .find(|m| &m.group_id == group_id && &m.student_id == student_id)
            .cloned())
    }

    async fn members_of_group(&self, group_id: &Uuid) -> Result<Vec<Membership>, MembershipQueryError> {
        let mut members: Vec<_> = self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.group_id == group_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(members)
    }

    async fn groups_for_student(&self, student_id: &Uuid) -> Result<Vec<Membership>, MembershipQueryError> {
        let mut memberships: Vec<_> = self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.student_id == student_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(memberships)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryLogEntries {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LogEntriesRepository for InMemoryLogEntries {
    async fn create_entry<'a>(&self, entry: &'a LogEntry) -> Result<&'a Uuid, CreateEntryError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(&entry.log_id)
    }

    async fn get_entry(&self, log_id: &Uuid) -> Result<LogEntry, GetEntryError> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| &e.log_id == log_id)
            .cloned()
            .ok_or(GetEntryError::NotFound)
    }

    async fn entries_for_group(&self, group_id: &Uuid, order: EntryOrder) -> Result<Vec<LogEntry>, QueryEntriesError> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.group_id == group_id)
            .cloned()
            .collect();
        match order {
            EntryOrder::NewestFirst => entries.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            EntryOrder::OldestFirst => entries.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        Ok(entries)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryFeedback {
    feedback: Mutex<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedback {
    async fn add_feedback<'a>(&self, feedback: &'a Feedback) -> Result<&'a Uuid, AddFeedbackError> {
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(&feedback.feedback_id)
    }

    async fn feedback_for_entry(&self, log_id: &Uuid) -> Result<Vec<Feedback>, QueryEntriesError> {
        let mut feedback: Vec<_> = self
            .feedback
            .lock()
            .unwrap()
            .iter()
            .filter(|f| &f.log_id == log_id)
            .cloned()
            .collect();
        feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feedback)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryAssignments {
    assignments: Mutex<Vec<Assignment>>,
}

#[async_trait]
impl AssignmentsRepository for InMemoryAssignments {
    async fn create_assignment<'a>(&self, assignment: &'a Assignment) -> Result<&'a Uuid, CreateAssignmentError> {
        self.assignments.lock().unwrap().push(assignment.clone());
        Ok(&assignment.assignment_id)
    }

    async fn get_assignment(&self, assignment_id: &Uuid) -> Result<Assignment, GetAssignmentError> {
        self.assignments
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.assignment_id == assignment_id)
            .cloned()
            .ok_or(GetAssignmentError::NotFound)
    }

    async fn assignments_for_group(&self, group_id: &Uuid) -> Result<Vec<Assignment>, QueryAssignmentsError> {
        let mut assignments: Vec<_> = self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| &a.group_id == group_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| a.due_at.cmp(&b.due_at));
        Ok(assignments)
    }
}

#[derive(Default)]
pub(crate) struct InMemorySubmissions {
    submissions: Mutex<Vec<Submission>>,
}

#[async_trait]
impl SubmissionsRepository for InMemorySubmissions {
    async fn create_submission(&self, submission: &Submission) -> Result<(), CreateSubmissionError> {
        let mut submissions = self.submissions.lock().unwrap();
        if submissions
            .iter()
            .any(|s| s.assignment_id == submission.assignment_id && s.student_id == submission.student_id)
        {
            return Err(CreateSubmissionError::DuplicateSubmission);
        }
        submissions.push(submission.clone());
        Ok(())
    }

    async fn submission(
        &self,
        assignment_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Submission>, QuerySubmissionsError> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.assignment_id == assignment_id && &s.student_id == student_id)
            .cloned())
    }

    async fn submissions_for_assignment(
        &self,
        assignment_id: &Uuid,
    ) -> Result<Vec<Submission>, QuerySubmissionsError> {
        let mut submissions: Vec<_> = self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| &s.assignment_id == assignment_id)
            .cloned()
            .collect();
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
        let mut submissions = self.submissions.lock().unwrap();
        let submission = submissions
            .iter_mut()
            .find(|s| &s.assignment_id == assignment_id && &s.student_id == student_id)
            .ok_or(PutGradeError::SubmissionNotFound)?;
        submission.grade = grade;
        submission.feedback = Some(feedback.to_owned());
        Ok(())
    }
}
