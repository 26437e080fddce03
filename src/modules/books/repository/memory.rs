use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_db::{Page, PageRequest};
use tokio::sync::RwLock;

use super::{new_id, BookRepository, RepositoryResult};
use crate::modules::books::models::BookRecord;

/// Book store held in process memory.
///
/// Clones share the same records. Ids are ObjectId hex strings, so iteration
/// order of the map is creation order for generated ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookRepository {
    books: Arc<RwLock<BTreeMap<String, BookRecord>>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn save(&self, mut record: BookRecord) -> RepositoryResult<BookRecord> {
        let id = record.id.get_or_insert_with(new_id).clone();
        tracing::debug!(book_id = %id, "saving book in memory");

        self.books.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn get_by_text_pattern(
        &self,
        page: PageRequest,
        pattern: &str,
    ) -> RepositoryResult<Page<BookRecord>> {
        let books = self.books.read().await;
        let matching: Vec<BookRecord> = books
            .values()
            .filter(|book| book.matches(pattern))
            .cloned()
            .collect();

        Ok(page.paginate(matching))
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<BookRecord>> {
        Ok(self.books.read().await.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
        let removed = self.books.write().await.remove(id);
        tracing::debug!(book_id = %id, existed = removed.is_some(), "deleted book from memory");
        Ok(())
    }
}
