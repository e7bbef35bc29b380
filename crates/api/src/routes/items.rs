//! Route definitions for the inventory tree, its history, and item
//! attachments, mounted at `/items`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{codes, emails, files, history, items, notes};
use crate::state::AppState;

/// Item routes mounted at `/items`.
///
/// ```text
/// GET    /                          -> list_items (?hierarchical=)
/// POST   /                          -> create_item
/// GET    /search                    -> search_items (?q=&hierarchical=)
/// GET    /history                   -> list_history (?item_id=&action_type=&limit=&offset=)
/// GET    /{id}                      -> get_item
/// PUT    /{id}                      -> update_item
/// PATCH  /{id}                      -> update_item
/// DELETE /{id}                      -> delete_item
/// POST   /{id}/move                 -> move_item
/// PUT    /{id}/parent               -> move_item
/// GET    /{id}/path                 -> get_item_path
/// GET    /{id}/siblings             -> list_siblings
/// GET    /{id}/history              -> item_history
///
/// GET    /{id}/notes                -> list_notes
/// POST   /{id}/notes                -> create_note
/// DELETE /{id}/notes/{note_id}      -> delete_note
/// GET    /{id}/files                -> list_files
/// POST   /{id}/files                -> upload_file (multipart)
/// GET    /{id}/files/{file_id}      -> download_file
/// DELETE /{id}/files/{file_id}      -> delete_file
/// GET    /{id}/emails               -> list_emails
/// POST   /{id}/emails               -> create_email
/// DELETE /{id}/emails/{email_id}    -> delete_email
/// GET    /{id}/codes                -> list_codes
/// POST   /{id}/codes                -> create_code
/// DELETE /{id}/codes/{code_id}      -> delete_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list_items).post(items::create_item))
        .route("/search", get(items::search_items))
        .route("/history", get(history::list_history))
        .route(
            "/{id}",
            get(items::get_item)
                .put(items::update_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route("/{id}/move", post(items::move_item))
        .route("/{id}/parent", put(items::move_item))
        .route("/{id}/path", get(items::get_item_path))
        .route("/{id}/siblings", get(items::list_siblings))
        .route("/{id}/history", get(history::item_history))
        // Notes
        .route("/{id}/notes", get(notes::list_notes).post(notes::create_note))
        .route("/{id}/notes/{note_id}", delete(notes::delete_note))
        // Files
        .route("/{id}/files", get(files::list_files).post(files::upload_file))
        .route(
            "/{id}/files/{file_id}",
            get(files::download_file).delete(files::delete_file),
        )
        // Emails
        .route(
            "/{id}/emails",
            get(emails::list_emails).post(emails::create_email),
        )
        .route("/{id}/emails/{email_id}", delete(emails::delete_email))
        // Codes
        .route("/{id}/codes", get(codes::list_codes).post(codes::create_code))
        .route("/{id}/codes/{code_id}", delete(codes::delete_code))
}
