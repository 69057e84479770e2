/*
 * Responsibility
 * - URL layout of v1
 *   - /notes, /notes/{id}: behind the authorizer gate
 *   - /authorize: the authorizer on its own (the token is in the body, so no gate)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    authorize::authorize,
    notes::{create_note, delete_note, get_note, get_notes, update_note},
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let notes = Router::new()
        .route("/notes", get(get_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        );
    let notes = middleware::auth::access::apply(notes, state);

    Router::new()
        .route("/authorize", post(authorize))
        .merge(notes)
}
