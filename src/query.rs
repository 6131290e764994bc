//! Owner-scoped document queries.
//!
//! A [`DocumentQuery`] can only be built from an owner id, so every read that
//! goes through it carries the owner predicate. Optional clauses are layered
//! on top and rendered either into a diesel query or an in-memory predicate.

use diesel::pg::Pg;
use diesel::prelude::*;

use crate::models::{Document, FileType};
use crate::schema::documents;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    owner_id: i64,
    file_type: Option<FileType>,
    text: Option<String>,
}

impl DocumentQuery {
    pub fn owned_by(owner_id: i64) -> Self {
        Self {
            owner_id,
            file_type: None,
            text: None,
        }
    }

    pub fn with_file_type(mut self, file_type: Option<FileType>) -> Self {
        self.file_type = file_type;
        self
    }

    /// Restricts to documents whose filename, original filename or extracted
    /// text contains `text`, ignoring case.
    pub fn containing(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn file_type(&self) -> Option<FileType> {
        self.file_type
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn matches(&self, document: &Document) -> bool {
        if document.user_id != self.owner_id {
            return false;
        }
        if let Some(file_type) = self.file_type {
            if document.file_type != file_type {
                return false;
            }
        }
        match &self.text {
            None => true,
            Some(text) => {
                let needle = text.to_lowercase();
                [
                    Some(document.filename.as_str()),
                    Some(document.original_filename.as_str()),
                    document.content_text.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn to_boxed(&self) -> documents::BoxedQuery<'static, Pg> {
        let mut query = documents::table
            .filter(documents::user_id.eq(self.owner_id))
            .into_boxed();

        if let Some(file_type) = self.file_type {
            query = query.filter(documents::file_type.eq(file_type));
        }

        if let Some(text) = &self.text {
            let pattern = format!("%{}%", escape_like(text));
            query = query.filter(
                documents::filename
                    .ilike(pattern.clone())
                    .or(documents::original_filename.ilike(pattern.clone()))
                    .or(documents::content_text.ilike(pattern)),
            );
        }

        query
    }
}

/// Escapes LIKE metacharacters so the search text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
