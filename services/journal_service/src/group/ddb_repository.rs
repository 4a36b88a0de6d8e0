use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use common_macros::hash_map;
use service_core::ddb::get_item::GetItemInput;
use service_core::ddb::put_item::PutItemInput;
use service_core::ddb::query::QueryInput;
use uuid::Uuid;

use crate::ddb_interop::{self, ThreadSafeDdbClient};
use crate::group::{
    AddMemberError, CreateGroupError, GetGroupError, Group, GroupsRepository, Membership, MembershipQueryError,
    MembershipsRepository,
};

/// Upper bound on items fetched per listing query. Groups are classroom-sized,
/// so a single page is always enough.
const QUERY_PAGE_LIMIT: i32 = 512;

pub struct DdbGroupsRepository<T: ThreadSafeDdbClient> {
    ddb: T,
    groups_table_name: String,
}

impl<T: ThreadSafeDdbClient> DdbGroupsRepository<T> {
    pub fn new(ddb: T, groups_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            groups_table_name: groups_table_name.into(),
        }
    }

    async fn query_groups(
        &self,
        index_name: &str,
        key_condition: &str,
        value: AttributeValue,
    ) -> Result<Vec<Group>, MembershipQueryError> {
        let query_input = QueryInput::builder()
            .index_name(index_name)
            .table_name(self.groups_table_name.as_str())
            .key_condition_expression(key_condition)
            .select(Select::AllProjectedAttributes)
            .expression_attribute_values(Some(hash_map! { ":v".to_string() => value }))
            .limit(QUERY_PAGE_LIMIT)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| MembershipQueryError::Other(e.into()))?;

        output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| ddb_interop::from_hashmap(item).map_err(MembershipQueryError::Serde))
            .collect()
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> GroupsRepository for DdbGroupsRepository<T> {
    async fn create_group<'a>(&self, group: &'a Group) -> Result<&'a Uuid, CreateGroupError> {
        if group.name.is_empty() {
            return Err(CreateGroupError::Validation("Group name is required."));
        }
        if group.join_secret.is_empty() {
            return Err(CreateGroupError::Validation("Join secret is required."));
        }

        // Cross-item uniqueness has no conditional expression; the index
        // lookup before the insert is what enforces it.
        match self.group_by_join_secret(&group.join_secret).await {
            Ok(_) => return Err(CreateGroupError::DuplicateJoinSecret),
            Err(GetGroupError::NotFound) => {}
            Err(GetGroupError::Serde(e)) => return Err(CreateGroupError::Other(e.into())),
            Err(GetGroupError::Other(e)) => return Err(CreateGroupError::Other(e)),
        }

        let item = ddb_interop::to_hashmap(&group).map_err(|e| CreateGroupError::Other(e.into()))?;
        let put_item_input = PutItemInput::builder()
            .table_name(self.groups_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(GroupId)")
            .build();

        self.ddb
            .put_item(put_item_input)
            .await
            .map_err(|e| CreateGroupError::Other(e.into()))?;

        Ok(&group.group_id)
    }

    async fn get_group(&self, group_id: &Uuid) -> Result<Group, GetGroupError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.groups_table_name.as_str())
            .key(hash_map! {
                "GroupId".to_string() => AttributeValue::S(group_id.to_string()),
            })
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| GetGroupError::Other(e.into()))?;

        match output.item {
            None => Err(GetGroupError::NotFound),
            Some(item) => ddb_interop::from_hashmap(item).map_err(GetGroupError::Serde),
        }
    }

    async fn group_by_join_secret(&self, join_secret: &str) -> Result<Group, GetGroupError> {
        let query_input = QueryInput::builder()
            .index_name("JoinSecretIndex")
            .table_name(self.groups_table_name.as_str())
            .key_condition_expression("JoinSecret = :v")
            .select(Select::AllProjectedAttributes)
            .expression_attribute_values(Some(hash_map! {
                ":v".to_string() => AttributeValue::S(join_secret.to_owned()),
            }))
            .limit(1)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| GetGroupError::Other(e.into()))?;

        let item = output
            .items
            .ok_or_else(|| GetGroupError::Other("Malformed reply: missing items".into()))?
            .pop()
            .ok_or(GetGroupError::NotFound)?;
        ddb_interop::from_hashmap(item).map_err(GetGroupError::Serde)
    }

    async fn groups_for_teacher(&self, teacher_id: &Uuid) -> Result<Vec<Group>, MembershipQueryError> {
        let mut groups = self
            .query_groups(
                "TeacherIdIndex",
                "TeacherId = :v",
                AttributeValue::S(teacher_id.to_string()),
            )
            .await?;
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }
}

pub struct DdbMembershipsRepository<T: ThreadSafeDdbClient> {
    ddb: T,
    memberships_table_name: String,
}

impl<T: ThreadSafeDdbClient> DdbMembershipsRepository<T> {
    pub fn new(ddb: T, memberships_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            memberships_table_name: memberships_table_name.into(),
        }
    }

    async fn query_memberships(
        &self,
        index_name: Option<&str>,
        key_condition: &str,
        value: AttributeValue,
    ) -> Result<Vec<Membership>, MembershipQueryError> {
        let builder = QueryInput::builder()
            .table_name(self.memberships_table_name.as_str())
            .key_condition_expression(key_condition)
            .expression_attribute_values(Some(hash_map! { ":v".to_string() => value }))
            .limit(QUERY_PAGE_LIMIT);
        let query = match index_name {
            Some(index_name) => builder.index_name(index_name).select(Select::AllProjectedAttributes).build(),
            None => builder.build(),
        };
        let output = self
            .ddb
            .query(query)
            .await
            .map_err(|e| MembershipQueryError::Other(e.into()))?;

        let mut memberships = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| ddb_interop::from_hashmap(item).map_err(MembershipQueryError::Serde))
            .collect::<Result<Vec<Membership>, _>>()?;
        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(memberships)
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> MembershipsRepository for DdbMembershipsRepository<T> {
    async fn add_member(&self, membership: &Membership) -> Result<(), AddMemberError> {
        let item = ddb_interop::to_hashmap(&membership).map_err(|e| AddMemberError::Other(e.into()))?;
        let put_item_input = PutItemInput::builder()
            .table_name(self.memberships_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(GroupId) and attribute_not_exists(StudentId)")
            .build();

        self.ddb.put_item(put_item_input).await.map_err(|err| match &err {
            SdkError::ServiceError(service_err) if service_err.err().is_conditional_check_failed_exception() => {
                AddMemberError::AlreadyMember
            }
            _ => AddMemberError::Other(err.into()),
        })?;

        Ok(())
    }

    async fn membership(
        &self,
        group_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Membership>, MembershipQueryError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.memberships_table_name.as_str())
            .key(hash_map! {
                "GroupId".to_string() => AttributeValue::S(group_id.to_string()),
                "StudentId".to_string() => AttributeValue::S(student_id.to_string()),
            })
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| MembershipQueryError::Other(e.into()))?;

        output
            .item
            .map(|item| ddb_interop::from_hashmap(item).map_err(MembershipQueryError::Serde))
            .transpose()
    }

    async fn members_of_group(&self, group_id: &Uuid) -> Result<Vec<Membership>, MembershipQueryError> {
        self.query_memberships(None, "GroupId = :v", AttributeValue::S(group_id.to_string()))
            .await
    }

    async fn groups_for_student(&self, student_id: &Uuid) -> Result<Vec<Membership>, MembershipQueryError> {
        self.query_memberships(
            Some("StudentIdIndex"),
            "StudentId = :v",
            AttributeValue::S(student_id.to_string()),
        )
        .await
    }
}
