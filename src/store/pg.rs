use chrono::Utc;
use diesel::{
    pg::PgConnection,
    prelude::*,
    r2d2::{ConnectionManager, PooledConnection},
};

use super::{DocumentStore, UserStore};
use crate::db::PgPool;
use crate::error::ArchiveResult;
use crate::models::{Document, DocumentPatch, NewDocument, NewUser, User};
use crate::query::DocumentQuery;
use crate::schema::{documents, users};
use crate::validation::Pagination;

type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> ArchiveResult<PgPooledConnection> {
        Ok(self.pool.get()?)
    }
}

impl UserStore for PgStore {
    fn find_by_email(&self, email: &str) -> ArchiveResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    fn find_by_id(&self, user_id: i64) -> ArchiveResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    fn insert_user(&self, user: NewUser) -> ArchiveResult<User> {
        let mut conn = self.conn()?;
        let user = diesel::insert_into(users::table)
            .values(user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;
        Ok(user)
    }

    fn delete_user(&self, user_id: i64) -> ArchiveResult<bool> {
        let mut conn = self.conn()?;
        let deleted = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(documents::table.filter(documents::user_id.eq(user_id)))
                .execute(conn)?;
            diesel::delete(users::table.find(user_id)).execute(conn)
        })?;
        Ok(deleted > 0)
    }
}

impl DocumentStore for PgStore {
    fn insert_document(&self, owner_id: i64, document: &NewDocument) -> ArchiveResult<Document> {
        let mut conn = self.conn()?;
        let stored = diesel::insert_into(documents::table)
            .values(document.owned_by(owner_id))
            .returning(Document::as_returning())
            .get_result(&mut conn)?;
        Ok(stored)
    }

    fn find_document(&self, document_id: i64, owner_id: i64) -> ArchiveResult<Option<Document>> {
        let mut conn = self.conn()?;
        let document = documents::table
            .filter(documents::id.eq(document_id))
            .filter(documents::user_id.eq(owner_id))
            .select(Document::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(document)
    }

    fn page_documents(
        &self,
        query: &DocumentQuery,
        pagination: Pagination,
    ) -> ArchiveResult<Vec<Document>> {
        let mut conn = self.conn()?;
        let rows = query
            .to_boxed()
            .order((documents::created_at.desc(), documents::id.desc()))
            .limit(pagination.limit())
            .offset(pagination.offset())
            .load::<Document>(&mut conn)?;
        Ok(rows)
    }

    fn count_documents(&self, query: &DocumentQuery) -> ArchiveResult<i64> {
        let mut conn = self.conn()?;
        let total = query.to_boxed().count().get_result(&mut conn)?;
        Ok(total)
    }

    fn update_document(
        &self,
        document_id: i64,
        owner_id: i64,
        patch: &DocumentPatch,
    ) -> ArchiveResult<Option<Document>> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let updated = diesel::update(
            documents::table
                .filter(documents::id.eq(document_id))
                .filter(documents::user_id.eq(owner_id)),
        )
        .set(patch.changeset(now))
        .returning(Document::as_returning())
        .get_result(&mut conn)
        .optional()?;
        Ok(updated)
    }

    fn delete_document(&self, document_id: i64, owner_id: i64) -> ArchiveResult<bool> {
        let mut conn = self.conn()?;
        let removed = diesel::delete(
            documents::table
                .filter(documents::id.eq(document_id))
                .filter(documents::user_id.eq(owner_id)),
        )
        .execute(&mut conn)?;
        Ok(removed > 0)
    }
}

