use serde::{Deserialize, Deserializer, Serialize};

/// A book record as transferred over HTTP.
///
/// Every attribute except `id` is optional on input. `id` is assigned by the
/// store and ignored when clients send it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookRecord {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<String>,
    pub name: Option<String>,
    pub pages: Option<i32>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub city: Option<String>,
    pub department_id: Option<String>,
    pub summary: Option<String>,
    pub room: Option<String>,
}

impl BookRecord {
    /// Text attributes a search pattern is matched against
    pub fn searchable_text(&self) -> impl Iterator<Item = &str> {
        [
            &self.name,
            &self.kind,
            &self.publisher,
            &self.city,
            &self.summary,
            &self.room,
            &self.department_id,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .chain(self.authors.iter().map(String::as_str))
    }

    /// Case-insensitive substring match over [`BookRecord::searchable_text`].
    /// An empty pattern matches everything.
    pub fn matches(&self, pattern: &str) -> bool {
        if pattern.is_empty() {
            return true;
        }
        let needle = pattern.to_lowercase();
        self.searchable_text()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}

/// `authors` may be absent or `null`; both read as an empty list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Document field names covered by text pattern search
pub const SEARCHABLE_FIELDS: &[&str] = &[
    "name",
    "type",
    "publisher",
    "city",
    "summary",
    "room",
    "department_id",
    "authors",
];

/// Stored shape of a [`BookRecord`] in the `books` collection.
///
/// Same field names as the record, with the id held in `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<String>,
    pub name: Option<String>,
    pub pages: Option<i32>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub city: Option<String>,
    pub department_id: Option<String>,
    pub summary: Option<String>,
    pub room: Option<String>,
}

impl BookDocument {
    /// Build the stored form of `record` under `id`, ignoring `record.id`
    pub fn from_record(id: String, record: BookRecord) -> Self {
        Self {
            id,
            kind: record.kind,
            quantity: record.quantity,
            authors: record.authors,
            name: record.name,
            pages: record.pages,
            publisher: record.publisher,
            year: record.year,
            city: record.city,
            department_id: record.department_id,
            summary: record.summary,
            room: record.room,
        }
    }
}

impl From<BookDocument> for BookRecord {
    fn from(document: BookDocument) -> Self {
        Self {
            id: Some(document.id),
            kind: document.kind,
            quantity: document.quantity,
            authors: document.authors,
            name: document.name,
            pages: document.pages,
            publisher: document.publisher,
            year: document.year,
            city: document.city,
            department_id: document.department_id,
            summary: document.summary,
            room: document.room,
        }
    }
}
