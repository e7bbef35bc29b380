//! HTTP-level integration tests for item attachments: notes, files,
//! emails, and codes.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, create_item, delete, get, post_file, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_lifecycle(pool: PgPool) {
    let item = create_item(&pool, "Printer", None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/items/{item}/notes"),
        serde_json::json!({"content": "Toner replaced"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let note = body_json(response).await["data"].clone();
    assert_eq!(note["author"], "User");
    let note_id = note["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/items/{item}/notes")).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/items/{item}/notes/{note_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/items/{item}/notes/{note_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_on_missing_item_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/items/999999/notes",
        serde_json::json!({"content": "Nowhere"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attachment_count_in_listing(pool: PgPool) {
    let item = create_item(&pool, "Printer", None).await;
    for content in ["one", "two"] {
        let app = common::build_test_app(pool.clone());
        post_json(
            app,
            &format!("/api/v1/items/{item}/notes"),
            serde_json::json!({"content": content}),
        )
        .await;
    }

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/items").await).await;
    assert_eq!(json["data"][0]["attachment_count"], 2);
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_code_returns_409(pool: PgPool) {
    let item = create_item(&pool, "Monitor", None).await;
    let uri = format!("/api/v1/items/{item}/codes");

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &uri, serde_json::json!({"code": "SN-1", "source": "serial"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json(app, &uri, serde_json::json!({"code": "sn-1"})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_finds_item_by_attached_code(pool: PgPool) {
    let item = create_item(&pool, "Power supply", None).await;
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/items/{item}/codes"),
        serde_json::json!({"code": "PSU-750-X"}),
    )
    .await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/items/search?q=psu-750-x").await).await;
    let hits = json["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], item);
}

// ---------------------------------------------------------------------------
// Emails
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_attach_and_validation(pool: PgPool) {
    let item = create_item(&pool, "GPU", None).await;
    let uri = format!("/api/v1/items/{item}/emails");

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &uri,
        serde_json::json!({
            "subject": "Order shipped",
            "body": "On its way",
            "from_address": "shop@example.com",
            "received_at": "2025-03-01T09:30:00Z"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["processed"], false);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &uri,
        serde_json::json!({
            "subject": "Bad sender",
            "body": "",
            "from_address": "not-an-address",
            "received_at": "2025-03-01T09:30:00Z"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_file_upload_download_delete(pool: PgPool) {
    let item = create_item(&pool, "Router", None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_file(
        app,
        &format!("/api/v1/items/{item}/files"),
        "setup notes.txt",
        "text/plain",
        b"admin / admin",
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let file = body_json(response).await["data"].clone();
    assert_eq!(file["original_name"], "setup notes.txt");
    assert_eq!(file["size_bytes"], 13);
    assert!(file.get("storage_key").is_none());
    let file_id = file["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/items/{item}/files/{file_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(body_bytes(response).await, b"admin / admin");

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/items/{item}/files/{file_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/items/{item}/files/{file_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unsupported_file_type_returns_400(pool: PgPool) {
    let item = create_item(&pool, "Router", None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_file(
        app,
        &format!("/api/v1/items/{item}/files"),
        "firmware.exe",
        "application/x-msdownload",
        b"MZ",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/items/{item}/files")).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_item_purges_file_blobs(pool: PgPool) {
    let item = create_item(&pool, "Camera", None).await;
    let config = common::test_config();
    let storage_root = config.storage_root.clone();

    let app = common::build_app_with_config(pool.clone(), config.clone());
    let response = post_file(
        app,
        &format!("/api/v1/items/{item}/files"),
        "photo.png",
        "image/png",
        b"\x89PNG fake",
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let item_dir = storage_root.join(item.to_string());
    assert_eq!(std::fs::read_dir(&item_dir).unwrap().count(), 1);

    let app = common::build_app_with_config(pool, config);
    let response = delete(app, &format!("/api/v1/items/{item}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(std::fs::read_dir(&item_dir).unwrap().count(), 0);
}

// ---------------------------------------------------------------------------
// Item detail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_item_detail_lists_each_attachment_family(pool: PgPool) {
    let item = create_item(&pool, "Laptop", None).await;
    for content in ["Screen flickers", "Ordered new panel"] {
        let app = common::build_test_app(pool.clone());
        post_json(
            app,
            &format!("/api/v1/items/{item}/notes"),
            serde_json::json!({"content": content, "author": "Sam"}),
        )
        .await;
    }
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/items/{item}/emails"),
        serde_json::json!({
            "subject": "Panel shipped",
            "body": "Tracking attached",
            "from_address": "parts@example.com",
            "received_at": "2025-04-02T12:00:00Z"
        }),
    )
    .await;

    let app = common::build_test_app(pool);
    let data = body_json(get(app, &format!("/api/v1/items/{item}")).await).await["data"].clone();

    let notes = data["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    // Newest first.
    assert_eq!(notes[0]["content"], "Ordered new panel");
    assert_eq!(notes[0]["author"], "Sam");
    assert_eq!(data["emails"].as_array().unwrap().len(), 1);
    assert!(data["files"].as_array().unwrap().is_empty());
    assert!(data["codes"].as_array().unwrap().is_empty());
    assert_eq!(data["attachment_count"], 3);
}
