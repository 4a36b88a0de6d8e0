use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::{Feedback, LogEntry};

#[derive(Debug, Error)]
pub enum CreateEntryError {
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum GetEntryError {
    #[error("Log entry not found.")]
    NotFound,

    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum QueryEntriesError {
    #[error(transparent)]
    Serde(serde_dynamo::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum AddFeedbackError {
    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

/// Group views read newest entries first; the timeline reads oldest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOrder {
    NewestFirst,
    OldestFirst,
}

#[async_trait]
pub trait LogEntriesRepository {
    async fn create_entry<'a>(&self, entry: &'a LogEntry) -> Result<&'a Uuid, CreateEntryError>;

    async fn get_entry(&self, log_id: &Uuid) -> Result<LogEntry, GetEntryError>;

    async fn entries_for_group(&self, group_id: &Uuid, order: EntryOrder) -> Result<Vec<LogEntry>, QueryEntriesError>;
}

#[async_trait]
pub trait FeedbackRepository {
    async fn add_feedback<'a>(&self, feedback: &'a Feedback) -> Result<&'a Uuid, AddFeedbackError>;

    /// Feedback for one entry, newest first.
    async fn feedback_for_entry(&self, log_id: &Uuid) -> Result<Vec<Feedback>, QueryEntriesError>;
}
