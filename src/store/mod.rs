//! Persistence seams for users and documents.
//!
//! Document methods take the owner explicitly (or a [`DocumentQuery`], which
//! cannot exist without one); there is no way to address a document by id
//! alone.

pub mod memory;
pub mod pg;

use crate::error::ArchiveResult;
use crate::models::{Document, DocumentPatch, NewDocument, NewUser, User};
use crate::query::DocumentQuery;
use crate::validation::Pagination;

pub use memory::MemoryStore;
pub use pg::PgStore;

pub trait UserStore: Send + Sync + 'static {
    /// Exact match on the stored email.
    fn find_by_email(&self, email: &str) -> ArchiveResult<Option<User>>;

    fn find_by_id(&self, user_id: i64) -> ArchiveResult<Option<User>>;

    /// Fails with `DuplicateEmail` when the email is already taken.
    fn insert_user(&self, user: NewUser) -> ArchiveResult<User>;

    /// Removes the user together with every document they own, atomically.
    fn delete_user(&self, user_id: i64) -> ArchiveResult<bool>;
}

pub trait DocumentStore: Send + Sync + 'static {
    fn insert_document(&self, owner_id: i64, document: &NewDocument) -> ArchiveResult<Document>;

    fn find_document(&self, document_id: i64, owner_id: i64) -> ArchiveResult<Option<Document>>;

    /// Matching documents, newest first, windowed by `pagination`.
    fn page_documents(
        &self,
        query: &DocumentQuery,
        pagination: Pagination,
    ) -> ArchiveResult<Vec<Document>>;

    fn count_documents(&self, query: &DocumentQuery) -> ArchiveResult<i64>;

    fn update_document(
        &self,
        document_id: i64,
        owner_id: i64,
        patch: &DocumentPatch,
    ) -> ArchiveResult<Option<Document>>;

    fn delete_document(&self, document_id: i64, owner_id: i64) -> ArchiveResult<bool>;
}
