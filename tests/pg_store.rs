//! Runs the store contract against PostgreSQL. Skipped unless
//! `TEST_DATABASE_URL` points at a disposable database.

use std::env;

use anyhow::{anyhow, Result};
use diesel::connection::SimpleConnection;
use docvault::db;
use docvault::error::ArchiveError;
use docvault::models::{DocumentPatch, FileType, NewDocument, NewUser, UploadSource};
use docvault::query::DocumentQuery;
use docvault::store::{DocumentStore, PgStore, UserStore};
use docvault::validation::Pagination;
use once_cell::sync::Lazy;
use serde_json::json;
use tokio::sync::{Mutex, MutexGuard};

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct PgFixture {
    store: PgStore,
    _lock: MutexGuard<'static, ()>,
}

async fn fixture() -> Result<Option<PgFixture>> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL store test");
        return Ok(None);
    };
    let lock = DB_LOCK.lock().await;

    let pool = db::init_pool(&database_url)?;
    db::run_migrations(&pool)?;
    let mut conn = pool
        .get()
        .map_err(|err| anyhow!("failed to acquire connection: {err}"))?;
    conn.batch_execute("TRUNCATE TABLE documents, users RESTART IDENTITY CASCADE;")?;
    drop(conn);

    Ok(Some(PgFixture {
        store: PgStore::new(pool),
        _lock: lock,
    }))
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        password_hash: "hash".into(),
        name: "Pg".into(),
    }
}

fn new_document(filename: &str, content_text: Option<&str>) -> NewDocument {
    NewDocument {
        filename: filename.into(),
        original_filename: filename.into(),
        file_type: if filename.ends_with(".json") {
            FileType::Json
        } else {
            FileType::Pdf
        },
        file_size: 2048,
        file_path: format!("/uploads/{filename}"),
        content_text: content_text.map(str::to_owned),
        metadata: Some(json!({ "origin": "pg-test" })),
        upload_source: UploadSource::WebInterface,
        external_service_id: None,
    }
}

#[tokio::test]
async fn users_are_unique_by_email() -> Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };

    let user = fx.store.insert_user(new_user("pg@test.com"))?;
    assert_eq!(
        fx.store.find_by_email("pg@test.com")?.map(|u| u.id),
        Some(user.id)
    );
    assert_eq!(
        fx.store.insert_user(new_user("pg@test.com")).unwrap_err(),
        ArchiveError::DuplicateEmail
    );
    Ok(())
}

#[tokio::test]
async fn pages_are_newest_first_and_owner_scoped() -> Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };

    let owner = fx.store.insert_user(new_user("owner@test.com"))?;
    let other = fx.store.insert_user(new_user("other@test.com"))?;
    let mut inserted = Vec::new();
    for name in ["a.pdf", "b.json", "c.pdf"] {
        inserted.push(fx.store.insert_document(owner.id, &new_document(name, None))?);
    }
    fx.store
        .insert_document(other.id, &new_document("foreign.pdf", None))?;

    let query = DocumentQuery::owned_by(owner.id);
    let page = fx
        .store
        .page_documents(&query, Pagination::new(Some(2), Some(0))?)?;
    let ids: Vec<i64> = page.iter().map(|d| d.id).collect();
    assert_eq!(ids, [inserted[2].id, inserted[1].id]);
    assert_eq!(fx.store.count_documents(&query)?, 3);

    let pdfs = DocumentQuery::owned_by(owner.id).with_file_type(Some(FileType::Pdf));
    assert_eq!(fx.store.count_documents(&pdfs)?, 2);

    assert_eq!(fx.store.find_document(inserted[0].id, other.id)?, None);
    Ok(())
}

#[tokio::test]
async fn text_search_is_case_insensitive_and_escapes_wildcards() -> Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };

    let owner = fx.store.insert_user(new_user("search@test.com"))?;
    fx.store.insert_document(
        owner.id,
        &new_document("invoice.pdf", Some("Invoice for software subscription")),
    )?;
    fx.store
        .insert_document(owner.id, &new_document("100%_done.pdf", None))?;
    fx.store
        .insert_document(owner.id, &new_document("1000 done.pdf", None))?;

    let software = DocumentQuery::owned_by(owner.id).containing("SOFTWARE");
    assert_eq!(fx.store.count_documents(&software)?, 1);

    let literal = DocumentQuery::owned_by(owner.id).containing("0%_");
    let matches = fx.store.page_documents(&literal, Pagination::default())?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].filename, "100%_done.pdf");
    Ok(())
}

#[tokio::test]
async fn update_distinguishes_untouched_from_cleared() -> Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };

    let owner = fx.store.insert_user(new_user("patch@test.com"))?;
    let stranger = fx.store.insert_user(new_user("stranger@test.com"))?;
    let document = fx
        .store
        .insert_document(owner.id, &new_document("draft.pdf", Some("text")))?;

    let patch = DocumentPatch {
        content_text: Some(None),
        ..DocumentPatch::default()
    };
    assert_eq!(
        fx.store.update_document(document.id, stranger.id, &patch)?,
        None
    );

    let updated = fx
        .store
        .update_document(document.id, owner.id, &patch)?
        .ok_or_else(|| anyhow!("owner update returned nothing"))?;
    assert_eq!(updated.content_text, None);
    assert_eq!(updated.filename, "draft.pdf");
    assert_eq!(updated.metadata, document.metadata);
    assert!(updated.updated_at >= document.updated_at);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_takes_their_documents_along() -> Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };

    let leaving = fx.store.insert_user(new_user("leaving@test.com"))?;
    let staying = fx.store.insert_user(new_user("staying@test.com"))?;
    fx.store
        .insert_document(leaving.id, &new_document("a.pdf", None))?;
    fx.store
        .insert_document(staying.id, &new_document("b.pdf", None))?;

    assert!(fx.store.delete_user(leaving.id)?);
    assert!(!fx.store.delete_user(leaving.id)?);

    assert_eq!(
        fx.store
            .count_documents(&DocumentQuery::owned_by(leaving.id))?,
        0
    );
    assert_eq!(
        fx.store
            .count_documents(&DocumentQuery::owned_by(staying.id))?,
        1
    );
    Ok(())
}
