//! Owner-scoped document operations.
//!
//! Every method takes the caller's user id. Reads that miss, for whatever
//! reason, look exactly like reads of documents that do not exist.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{Document, DocumentPage, DocumentPatch, FileType, NewDocument};
use crate::query::DocumentQuery;
use crate::store::DocumentStore;
use crate::validation::Pagination;

#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, document: NewDocument, owner_id: i64) -> ArchiveResult<Document> {
        let stored = self.store.insert_document(owner_id, &document)?;
        info!(
            user_id = owner_id,
            document_id = stored.id,
            file_type = %stored.file_type,
            upload_source = %stored.upload_source,
            "stored document"
        );
        Ok(stored)
    }

    pub fn get(&self, document_id: i64, owner_id: i64) -> ArchiveResult<Option<Document>> {
        self.store.find_document(document_id, owner_id)
    }

    pub fn list(
        &self,
        owner_id: i64,
        file_type: Option<FileType>,
        pagination: Pagination,
    ) -> ArchiveResult<DocumentPage> {
        let query = DocumentQuery::owned_by(owner_id).with_file_type(file_type);
        self.page(&query, pagination)
    }

    pub fn search(
        &self,
        owner_id: i64,
        text: &str,
        file_type: Option<FileType>,
        pagination: Pagination,
    ) -> ArchiveResult<DocumentPage> {
        if text.is_empty() {
            return Err(ArchiveError::validation("query must not be empty"));
        }
        let query = DocumentQuery::owned_by(owner_id)
            .with_file_type(file_type)
            .containing(text);
        self.page(&query, pagination)
    }

    pub fn update(
        &self,
        document_id: i64,
        owner_id: i64,
        patch: &DocumentPatch,
    ) -> ArchiveResult<Document> {
        let updated = self
            .store
            .update_document(document_id, owner_id, patch)?
            .ok_or(ArchiveError::NotFoundOrForbidden)?;
        info!(user_id = owner_id, document_id, "updated document");
        Ok(updated)
    }

    /// `false` covers both a missing document and someone else's document.
    pub fn delete(&self, document_id: i64, owner_id: i64) -> ArchiveResult<bool> {
        let deleted = self.store.delete_document(document_id, owner_id)?;
        if deleted {
            info!(user_id = owner_id, document_id, "deleted document");
        }
        Ok(deleted)
    }

    // The page and the count are separate reads without a shared snapshot, so
    // a concurrent write in between can skew `total` and `has_more`.
    fn page(&self, query: &DocumentQuery, pagination: Pagination) -> ArchiveResult<DocumentPage> {
        let documents = self.store.page_documents(query, pagination)?;
        let total = self.store.count_documents(query)?;
        let returned = documents.len() as i64;
        debug!(
            user_id = query.owner_id(),
            returned,
            total,
            offset = pagination.offset(),
            "loaded document page"
        );
        Ok(DocumentPage {
            documents,
            total,
            has_more: pagination.offset() + returned < total,
        })
    }
}
