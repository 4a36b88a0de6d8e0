pub mod ddb_repository;
pub mod repository;
pub mod types;

pub use repository::{
    AddFeedbackError, CreateEntryError, EntryOrder, FeedbackRepository, GetEntryError, LogEntriesRepository,
    QueryEntriesError,
};
pub use types::{Feedback, LogEntry};
