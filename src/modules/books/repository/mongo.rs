use async_trait::async_trait;
use bookshelf_db::{Page, PageRequest};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    Collection,
};

use super::{new_id, BookRepository, RepositoryResult};
use crate::modules::books::models::{BookDocument, BookRecord, SEARCHABLE_FIELDS};

/// Book store backed by a MongoDB collection, one document per record.
///
/// Documents are mapped to [`BookDocument`] here rather than by the driver, so
/// a malformed stored document surfaces as a mapping error.
#[derive(Debug, Clone)]
pub struct MongoBookRepository {
    collection: Collection<Document>,
}

impl MongoBookRepository {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }
}

fn prepare_document(
    id: String,
    record: BookRecord,
) -> RepositoryResult<(BookDocument, Document)> {
    let document = BookDocument::from_record(id, record);
    let stored = bson::to_document(&document)?;
    Ok((document, stored))
}

fn restore_record(stored: Document) -> RepositoryResult<BookRecord> {
    let document: BookDocument = bson::from_document(stored)?;
    Ok(BookRecord::from(document))
}

/// Filter selecting documents whose searchable fields contain `pattern`,
/// ignoring case. The pattern is matched literally.
pub(crate) fn text_pattern_filter(pattern: &str) -> Document {
    if pattern.is_empty() {
        return doc! {};
    }

    let escaped = regex::escape(pattern);
    let clauses: Vec<Bson> = SEARCHABLE_FIELDS
        .iter()
        .map(|&field| {
            Bson::Document(doc! {
                field: { "$regex": escaped.as_str(), "$options": "i" }
            })
        })
        .collect();

    doc! { "$or": clauses }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    async fn save(&self, record: BookRecord) -> RepositoryResult<BookRecord> {
        let id = record.id.clone().unwrap_or_else(new_id);
        let (document, stored) = prepare_document(id.clone(), record)?;

        self.collection
            .replace_one(doc! { "_id": id.as_str() }, stored)
            .upsert(true)
            .await?;

        tracing::debug!(book_id = %id, "saved book document");
        Ok(BookRecord::from(document))
    }

    async fn get_by_text_pattern(
        &self,
        page: PageRequest,
        pattern: &str,
    ) -> RepositoryResult<Page<BookRecord>> {
        let filter = text_pattern_filter(pattern);

        let total = self.collection.count_documents(filter.clone()).await?;
        let stored: Vec<Document> = self
            .collection
            .find(filter)
            .sort(doc! { "_id": 1 })
            .skip(page.offset())
            .limit(i64::try_from(page.size).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;
        let content = stored
            .into_iter()
            .map(restore_record)
            .collect::<RepositoryResult<Vec<_>>>()?;

        tracing::debug!(
            pattern,
            total,
            returned = content.len(),
            "queried book documents"
        );
        Ok(Page::new(content, page, total))
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<BookRecord>> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .map(restore_record)
            .transpose()
    }

    async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        tracing::debug!(book_id = %id, deleted = result.deleted_count, "deleted book document");
        Ok(())
    }
}
