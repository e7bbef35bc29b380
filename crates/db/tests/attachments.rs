//! Integration tests for the attachment registry (notes, files, emails, codes).
//!
//! Verifies that:
//! - Attachments require an existing item
//! - Invalid payloads are rejected before anything is written
//! - Attachments are removed together with their item
//! - Deleting an item reports the blob keys of its files

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use inventory_core::error::CoreError;
use inventory_core::tree::DeletePolicy;
use inventory_db::models::code::CreateCode;
use inventory_db::models::email::CreateEmail;
use inventory_db::models::file::NewItemFile;
use inventory_db::models::item::{CreateItem, Item};
use inventory_db::models::note::CreateNote;
use inventory_db::repositories::{CodeRepo, EmailRepo, FileRepo, ItemRepo, NoteRepo};
use inventory_db::StoreError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create(pool: &PgPool, name: &str, parent_id: Option<i64>) -> Item {
    ItemRepo::create(
        pool,
        &CreateItem {
            name: name.to_string(),
            description: None,
            qr_code: None,
            parent_id,
        },
    )
    .await
    .unwrap()
}

fn note(content: &str) -> CreateNote {
    CreateNote {
        content: content.to_string(),
        author: None,
    }
}

fn file(key: &str) -> NewItemFile {
    NewItemFile {
        original_name: "manual.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        size_bytes: 1024,
        sha256: "ab".repeat(32),
        storage_key: key.to_string(),
    }
}

fn email() -> CreateEmail {
    CreateEmail {
        subject: "Order shipped".to_string(),
        body: "Your graphics card is on its way.".to_string(),
        from_address: "shop@example.com".to_string(),
        received_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
        processed: false,
    }
}

fn code(value: &str) -> CreateCode {
    CreateCode {
        code: value.to_string(),
        source: None,
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_defaults_author(pool: PgPool) {
    let item = create(&pool, "Printer", None).await;

    let created = NoteRepo::create(&pool, item.id, &note("Toner replaced"))
        .await
        .unwrap();
    assert_eq!(created.author, "User");

    let notes = NoteRepo::list_for_item(&pool, item.id).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "Toner replaced");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_on_missing_item_fails(pool: PgPool) {
    let result = NoteRepo::create(&pool, 404_404, &note("Nowhere")).await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::NotFound { entity: "Item", id: 404_404 }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blank_note_is_rejected(pool: PgPool) {
    let item = create(&pool, "Printer", None).await;

    let result = NoteRepo::create(&pool, item.id, &note("  ")).await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
    assert!(NoteRepo::list_for_item(&pool, item.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_delete_is_scoped_to_item(pool: PgPool) {
    let a = create(&pool, "A", None).await;
    let b = create(&pool, "B", None).await;
    let n = NoteRepo::create(&pool, a.id, &note("belongs to A")).await.unwrap();

    assert!(!NoteRepo::delete(&pool, b.id, n.id).await.unwrap());
    assert!(NoteRepo::delete(&pool, a.id, n.id).await.unwrap());
    assert!(!NoteRepo::delete(&pool, a.id, n.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_file_metadata_round_trip(pool: PgPool) {
    let item = create(&pool, "Router", None).await;

    let created = FileRepo::create(&pool, item.id, &file("1/abc-manual.pdf"))
        .await
        .unwrap();
    let found = FileRepo::find(&pool, item.id, created.id)
        .await
        .unwrap()
        .expect("file should exist");
    assert_eq!(found.storage_key, "1/abc-manual.pdf");

    let removed = FileRepo::delete(&pool, item.id, created.id).await.unwrap();
    assert_eq!(removed.map(|f| f.id), Some(created.id));
    assert!(FileRepo::find(&pool, item.id, created.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_reports_storage_keys_of_subtree(pool: PgPool) {
    let desk = create(&pool, "Desk", None).await;
    let drawer = create(&pool, "Drawer", Some(desk.id)).await;
    FileRepo::create(&pool, desk.id, &file("desk/a-receipt.pdf"))
        .await
        .unwrap();
    FileRepo::create(&pool, drawer.id, &file("drawer/b-photo.pdf"))
        .await
        .unwrap();

    let outcome = ItemRepo::delete(&pool, desk.id, DeletePolicy::Cascade)
        .await
        .unwrap();

    let mut keys = outcome.storage_keys.clone();
    keys.sort();
    assert_eq!(keys, vec!["desk/a-receipt.pdf", "drawer/b-photo.pdf"]);
    assert!(FileRepo::list_for_item(&pool, drawer.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Emails
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_attach_and_list(pool: PgPool) {
    let item = create(&pool, "GPU", None).await;

    let created = EmailRepo::create(&pool, item.id, &email()).await.unwrap();
    assert!(!created.processed);

    let emails = EmailRepo::list_for_item(&pool, item.id).await.unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].from_address, "shop@example.com");
    assert!(EmailRepo::delete(&pool, item.id, created.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_code_defaults_source_and_rejects_duplicates(pool: PgPool) {
    let item = create(&pool, "Monitor", None).await;

    let created = CodeRepo::create(&pool, item.id, &code("SN-555")).await.unwrap();
    assert_eq!(created.source, "manual");

    let duplicate = CodeRepo::create(&pool, item.id, &code("sn-555")).await;
    assert_matches!(
        duplicate,
        Err(StoreError::Database(sqlx::Error::Database(ref e)))
            if e.constraint() == Some("uq_item_codes_item_code")
    );

    // The same code on another item is fine.
    let other = create(&pool, "Other monitor", None).await;
    assert!(CodeRepo::create(&pool, other.id, &code("SN-555")).await.is_ok());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_code_is_rejected(pool: PgPool) {
    let item = create(&pool, "Monitor", None).await;
    let result = CodeRepo::create(&pool, item.id, &code("has space")).await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attachments_go_with_their_item(pool: PgPool) {
    let parent = create(&pool, "Cabinet", None).await;
    let item = create(&pool, "Laptop", Some(parent.id)).await;
    NoteRepo::create(&pool, item.id, &note("Battery swollen")).await.unwrap();
    EmailRepo::create(&pool, item.id, &email()).await.unwrap();
    CodeRepo::create(&pool, item.id, &code("LT-1")).await.unwrap();

    ItemRepo::delete(&pool, parent.id, DeletePolicy::Cascade)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM item_notes) \
              + (SELECT COUNT(*) FROM item_emails) \
              + (SELECT COUNT(*) FROM item_codes)",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_orphaned_child_keeps_its_attachments(pool: PgPool) {
    let parent = create(&pool, "Cabinet", None).await;
    let item = create(&pool, "Laptop", Some(parent.id)).await;
    NoteRepo::create(&pool, item.id, &note("Keep me")).await.unwrap();

    ItemRepo::delete(&pool, parent.id, DeletePolicy::Orphan)
        .await
        .unwrap();

    assert_eq!(NoteRepo::list_for_item(&pool, item.id).await.unwrap().len(), 1);
}
