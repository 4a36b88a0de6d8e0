use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use common_macros::hash_map;
use serde::{Deserialize, Serialize};
use service_core::ddb::get_item::GetItemInput;
use service_core::ddb::put_item::PutItemInput;
use service_core::ddb::query::QueryInput;
use uuid::Uuid;

use crate::ddb_interop::{self, ThreadSafeDdbClient};
use crate::journal::{
    AddFeedbackError, CreateEntryError, EntryOrder, Feedback, FeedbackRepository, GetEntryError, LogEntriesRepository,
    LogEntry, QueryEntriesError,
};

const QUERY_PAGE_LIMIT: i32 = 512;

pub struct DdbLogEntriesRepository<T: ThreadSafeDdbClient> {
    ddb: T,
    log_entries_table_name: String,
}

/// Projection stored on the `LogIdIndex` GSI; enough to reconstruct the
/// composite table key.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LogIdIndexProjection {
    group_id: Uuid,
    log_id: Uuid,
}

impl<T: ThreadSafeDdbClient> DdbLogEntriesRepository<T> {
    pub fn new(ddb: T, log_entries_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            log_entries_table_name: log_entries_table_name.into(),
        }
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> LogEntriesRepository for DdbLogEntriesRepository<T> {
    async fn create_entry<'a>(&self, entry: &'a LogEntry) -> Result<&'a Uuid, CreateEntryError> {
        if entry.title.is_empty() {
            return Err(CreateEntryError::Validation("Title is required."));
        }
        if entry.body.is_empty() {
            return Err(CreateEntryError::Validation("Body is required."));
        }

        let item = ddb_interop::to_hashmap(&entry).map_err(|e| CreateEntryError::Other(e.into()))?;
        let put_item_input = PutItemInput::builder()
            .table_name(self.log_entries_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(LogId)")
            .build();

        self.ddb
            .put_item(put_item_input)
            .await
            .map_err(|e| CreateEntryError::Other(e.into()))?;

        Ok(&entry.log_id)
    }

    async fn get_entry(&self, log_id: &Uuid) -> Result<LogEntry, GetEntryError> {
        let query_input = QueryInput::builder()
            .index_name("LogIdIndex")
            .table_name(self.log_entries_table_name.as_str())
            .key_condition_expression("LogId = :v")
            .select(Select::AllProjectedAttributes)
            .expression_attribute_values(Some(hash_map! {
                ":v".to_string() => AttributeValue::S(log_id.to_string()),
            }))
            .limit(1)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| GetEntryError::Other(e.into()))?;

        let item = output
            .items
            .ok_or_else(|| GetEntryError::Other("Malformed reply: missing items".into()))?
            .pop()
            .ok_or(GetEntryError::NotFound)?;
        let projection: LogIdIndexProjection = ddb_interop::from_hashmap(item).map_err(GetEntryError::Serde)?;

        let get_item_input = GetItemInput::builder()
            .table_name(self.log_entries_table_name.as_str())
            .key(hash_map! {
                "GroupId".to_string() => AttributeValue::S(projection.group_id.to_string()),
                "LogId".to_string() => AttributeValue::S(projection.log_id.to_string()),
            })
            .consistent_read(true)
            .build();
        let output = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| GetEntryError::Other(e.into()))?;

        match output.item {
            None => Err(GetEntryError::NotFound),
            Some(item) => ddb_interop::from_hashmap(item).map_err(GetEntryError::Serde),
        }
    }

    async fn entries_for_group(&self, group_id: &Uuid, order: EntryOrder) -> Result<Vec<LogEntry>, QueryEntriesError> {
        let query_input = QueryInput::builder()
            .table_name(self.log_entries_table_name.as_str())
            .key_condition_expression("GroupId = :v")
            .expression_attribute_values(Some(hash_map! {
                ":v".to_string() => AttributeValue::S(group_id.to_string()),
            }))
            .limit(QUERY_PAGE_LIMIT)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| QueryEntriesError::Other(e.into()))?;

        let mut entries = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| ddb_interop::from_hashmap(item).map_err(QueryEntriesError::Serde))
            .collect::<Result<Vec<LogEntry>, _>>()?;
        // The sort key is the entry id, so chronological order is restored here.
        match order {
            EntryOrder::NewestFirst => entries.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            EntryOrder::OldestFirst => entries.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        Ok(entries)
    }
}

pub struct DdbFeedbackRepository<T: ThreadSafeDdbClient> {
    ddb: T,
    feedback_table_name: String,
}

impl<T: ThreadSafeDdbClient> DdbFeedbackRepository<T> {
    pub fn new(ddb: T, feedback_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            feedback_table_name: feedback_table_name.into(),
        }
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> FeedbackRepository for DdbFeedbackRepository<T> {
    async fn add_feedback<'a>(&self, feedback: &'a Feedback) -> Result<&'a Uuid, AddFeedbackError> {
        let item = ddb_interop::to_hashmap(&feedback).map_err(|e| AddFeedbackError::Other(e.into()))?;
        let put_item_input = PutItemInput::builder()
            .table_name(self.feedback_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(FeedbackId)")
            .build();

        self.ddb
            .put_item(put_item_input)
            .await
            .map_err(|e| AddFeedbackError::Other(e.into()))?;

        Ok(&feedback.feedback_id)
    }

    async fn feedback_for_entry(&self, log_id: &Uuid) -> Result<Vec<Feedback>, QueryEntriesError> {
        let query_input = QueryInput::builder()
            .table_name(self.feedback_table_name.as_str())
            .key_condition_expression("LogId = :v")
            .expression_attribute_values(Some(hash_map! {
                ":v".to_string() => AttributeValue::S(log_id.to_string()),
            }))
            .limit(QUERY_PAGE_LIMIT)
            .build();
        let output = self
            .ddb
            .query(query_input)
            .await
            .map_err(|e| QueryEntriesError::Other(e.into()))?;

        let mut feedback = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| ddb_interop::from_hashmap(item).map_err(QueryEntriesError::Serde))
            .collect::<Result<Vec<Feedback>, _>>()?;
        feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feedback)
    }
}
