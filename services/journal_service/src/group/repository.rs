use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::{Group, Membership};

#[derive(Debug, Error)]
pub enum CreateGroupError {
    #[error("A group with this join secret already exists.")]
    DuplicateJoinSecret,

    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum GetGroupError {
    #[error("Group not found.")]
    NotFound,

    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum AddMemberError {
    #[error("The student is already a member of this group.")]
    AlreadyMember,

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum MembershipQueryError {
    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[async_trait]
pub trait GroupsRepository {
    async fn create_group<'a>(&self, group: &'a Group) -> Result<&'a Uuid, CreateGroupError>;

    async fn get_group(&self, group_id: &Uuid) -> Result<Group, GetGroupError>;

    /// Exact-match lookup on the join secret. Secrets are unique across
    /// groups, so at most one group can match.
    async fn group_by_join_secret(&self, join_secret: &str) -> Result<Group, GetGroupError>;

    async fn groups_for_teacher(&self, teacher_id: &Uuid) -> Result<Vec<Group>, MembershipQueryError>;
}

#[async_trait]
pub trait MembershipsRepository {
    /// Inserts the membership, failing with `AlreadyMember` when a row for
    /// the same (group, student) pair exists. The write is conditional, so
    /// two concurrent joins cannot both succeed.
    async fn add_member(&self, membership: &Membership) -> Result<(), AddMemberError>;

    async fn membership(&self, group_id: &Uuid, student_id: &Uuid)
        -> Result<Option<Membership>, MembershipQueryError>;

    async fn members_of_group(&self, group_id: &Uuid) -> Result<Vec<Membership>, MembershipQueryError>;

    async fn groups_for_student(&self, student_id: &Uuid) -> Result<Vec<Membership>, MembershipQueryError>;
}
