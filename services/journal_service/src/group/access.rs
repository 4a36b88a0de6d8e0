use crate::group::{Group, MembershipQueryError, MembershipsRepository};
use crate::session::Identity;
use crate::user_account::AccountRole;

/// Gate every group-scoped read or write: the owning teacher and enrolled
/// students get through, admins see everything, everyone else is refused.
pub async fn has_access(
    identity: &Identity,
    group: &Group,
    memberships: &impl MembershipsRepository,
) -> Result<bool, MembershipQueryError> {
    if identity.role == AccountRole::Admin || group.teacher_id == identity.account_id {
        return Ok(true);
    }

    Ok(memberships
        .membership(&group.group_id, &identity.account_id)
        .await?
        .is_some())
}
