pub mod access;
pub mod ddb_repository;
pub mod repository;
pub mod types;

pub use access::has_access;
pub use repository::{
    AddMemberError, CreateGroupError, GetGroupError, GroupsRepository, MembershipQueryError, MembershipsRepository,
};
pub use types::{Group, Membership};
