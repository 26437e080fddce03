use std::sync::Arc;

use bookshelf_db::{Page, PageRequest};

use super::models::BookRecord;
use super::repository::{BookRepository, RepositoryResult};

/// Book operations exposed to the HTTP layer, independent of the store behind
/// them.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn save(&self, record: BookRecord) -> RepositoryResult<BookRecord> {
        self.repository.save(record).await
    }

    pub async fn get_paginated(
        &self,
        page: PageRequest,
        pattern: &str,
    ) -> RepositoryResult<Page<BookRecord>> {
        self.repository.get_by_text_pattern(page, pattern).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<BookRecord>> {
        self.repository.find_by_id(id).await
    }

    /// Deleting an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.repository.delete_by_id(id).await
    }
}
