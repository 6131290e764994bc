use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::{DocumentStore, UserStore};
use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{Document, DocumentPatch, NewDocument, NewUser, UploadSource, User};
use crate::query::DocumentQuery;
use crate::validation::Pagination;

/// Process-local store with the same contract as [`super::PgStore`].
///
/// Ids are handed out from per-table counters, so id order is insertion
/// order, exactly like the `BIGSERIAL` columns in PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    documents: BTreeMap<i64, Document>,
    last_user_id: i64,
    last_document_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ArchiveResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| ArchiveError::storage("memory store lock poisoned"))
    }

    fn write(&self) -> ArchiveResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| ArchiveError::storage("memory store lock poisoned"))
    }
}

impl UserStore for MemoryStore {
    fn find_by_email(&self, email: &str) -> ArchiveResult<Option<User>> {
        let tables = self.read()?;
        Ok(tables
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    fn find_by_id(&self, user_id: i64) -> ArchiveResult<Option<User>> {
        Ok(self.read()?.users.get(&user_id).cloned())
    }

    fn insert_user(&self, user: NewUser) -> ArchiveResult<User> {
        let mut tables = self.write()?;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(ArchiveError::DuplicateEmail);
        }

        tables.last_user_id += 1;
        let now = Utc::now().naive_utc();
        let stored = User {
            id: tables.last_user_id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn delete_user(&self, user_id: i64) -> ArchiveResult<bool> {
        let mut tables = self.write()?;
        if tables.users.remove(&user_id).is_none() {
            return Ok(false);
        }
        tables
            .documents
            .retain(|_, document| document.user_id != user_id);
        Ok(true)
    }
}

impl DocumentStore for MemoryStore {
    fn insert_document(&self, owner_id: i64, document: &NewDocument) -> ArchiveResult<Document> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&owner_id) {
            return Err(ArchiveError::storage(format!(
                "owner {owner_id} does not exist"
            )));
        }
        check_document_row(document)?;

        tables.last_document_id += 1;
        let now = Utc::now().naive_utc();
        let stored = Document {
            id: tables.last_document_id,
            user_id: owner_id,
            filename: document.filename.clone(),
            original_filename: document.original_filename.clone(),
            file_type: document.file_type,
            file_size: document.file_size,
            file_path: document.file_path.clone(),
            content_text: document.content_text.clone(),
            metadata: document.metadata.clone(),
            upload_source: document.upload_source,
            external_service_id: document.external_service_id.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_document(&self, document_id: i64, owner_id: i64) -> ArchiveResult<Option<Document>> {
        let tables = self.read()?;
        Ok(tables
            .documents
            .get(&document_id)
            .filter(|document| document.user_id == owner_id)
            .cloned())
    }

    fn page_documents(
        &self,
        query: &DocumentQuery,
        pagination: Pagination,
    ) -> ArchiveResult<Vec<Document>> {
        let tables = self.read()?;
        let mut matching: Vec<&Document> = tables
            .documents
            .values()
            .filter(|document| query.matches(document))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(0);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count_documents(&self, query: &DocumentQuery) -> ArchiveResult<i64> {
        let tables = self.read()?;
        let total = tables
            .documents
            .values()
            .filter(|document| query.matches(document))
            .count();
        i64::try_from(total).map_err(ArchiveError::storage)
    }

    fn update_document(
        &self,
        document_id: i64,
        owner_id: i64,
        patch: &DocumentPatch,
    ) -> ArchiveResult<Option<Document>> {
        let mut tables = self.write()?;
        let Some(document) = tables
            .documents
            .get_mut(&document_id)
            .filter(|document| document.user_id == owner_id)
        else {
            return Ok(None);
        };

        patch.apply_to(document);
        document.updated_at = Utc::now().naive_utc();
        Ok(Some(document.clone()))
    }

    fn delete_document(&self, document_id: i64, owner_id: i64) -> ArchiveResult<bool> {
        let mut tables = self.write()?;
        let owned = tables
            .documents
            .get(&document_id)
            .is_some_and(|document| document.user_id == owner_id);
        if owned {
            tables.documents.remove(&document_id);
        }
        Ok(owned)
    }
}

/// Row rules the PostgreSQL schema enforces with CHECK constraints.
fn check_document_row(document: &NewDocument) -> ArchiveResult<()> {
    if document.file_size <= 0 {
        return Err(ArchiveError::storage(
            "documents row violates check constraint documents_file_size_check",
        ));
    }
    if document.external_service_id.is_some()
        && document.upload_source != UploadSource::ExternalService
    {
        return Err(ArchiveError::storage(
            "documents row violates check constraint documents_external_id_source",
        ));
    }
    Ok(())
}
