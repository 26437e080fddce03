//! Persistence contract for book records and its store implementations.

mod memory;
mod mongo;

use async_trait::async_trait;
use bookshelf_db::{Page, PageRequest};
use thiserror::Error;

use super::models::BookRecord;

pub use memory::InMemoryBookRepository;
pub use mongo::MongoBookRepository;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("document store error: {0}")]
    Backend(#[from] mongodb::error::Error),

    /// A record could not be mapped to or from its stored document
    #[error("document mapping error: {0}")]
    Serialization(String),
}

impl From<mongodb::bson::ser::Error> for RepositoryError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for RepositoryError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage operations the book service relies on.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert `record`, assigning an id when it has none, or fully replace the
    /// stored record with the same id. Returns the record as persisted.
    async fn save(&self, record: BookRecord) -> RepositoryResult<BookRecord>;

    /// One page of records matching `pattern`, ordered by id.
    ///
    /// Matching is a case-insensitive substring test over the text attributes
    /// listed in [`super::models::SEARCHABLE_FIELDS`]; an empty pattern
    /// matches every record.
    async fn get_by_text_pattern(
        &self,
        page: PageRequest,
        pattern: &str,
    ) -> RepositoryResult<Page<BookRecord>>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<BookRecord>>;

    /// Remove the record; absent ids are not an error.
    async fn delete_by_id(&self, id: &str) -> RepositoryResult<()>;
}

/// Fresh store-assigned id
pub(crate) fn new_id() -> String {
    mongodb::bson::oid::ObjectId::new().to_hex()
}
