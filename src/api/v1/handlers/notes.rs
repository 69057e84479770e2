/*
 * Responsibility
 * - /notes CRUD handlers: one request -> one storage call -> one envelope
 * - Every storage error is caught here and becomes a 500 with an error description
 * - Only runs behind the authorizer gate (AuthCtx is present)
 */
use axum::extract::State;

use crate::{
    api::v1::{
        dto::notes::{ListNotesQuery, NoteInput},
        extractors::{AuthCtxExtractor, JsonBody, PathParam, QueryParams},
    },
    error::AppError,
    repos::{Note, StoreError},
    response::ApiResponse,
    state::AppState,
};

fn storage_failure(message: &'static str, operation: &'static str, e: StoreError) -> AppError {
    tracing::error!(operation, error = %e, code = e.code(), "note storage call failed");
    AppError::storage(message, e)
}

pub async fn create_note(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    JsonBody(req): JsonBody<NoteInput>,
) -> Result<ApiResponse<Note>, AppError> {
    let note = Note::create(req.title, req.body);

    state.notes.put_if_absent(&note).await.map_err(|e| {
        storage_failure("An error occurred while creating the note", "create", e)
    })?;

    tracing::debug!(note_id = %note.note_id, subject = %auth.subject, "note created");
    Ok(ApiResponse::created(
        "The note was successfully created",
        note,
    ))
}

pub async fn get_notes(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListNotesQuery>,
) -> Result<ApiResponse<Vec<Note>>, AppError> {
    let limit = query.limit().map_err(AppError::bad_request)?;

    let notes = state.notes.scan(limit).await.map_err(|e| {
        storage_failure("An error occurred while retrieving the notes", "scan", e)
    })?;

    Ok(ApiResponse::ok("The notes were successfully retrieved", notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    PathParam(note_id): PathParam<String>,
) -> Result<ApiResponse<Note>, AppError> {
    let note = state
        .notes
        .get(&note_id)
        .await
        .map_err(|e| storage_failure("An error occurred while retrieving the note", "get", e))?
        .ok_or(AppError::NotFound("The note was not found"))?;

    Ok(ApiResponse::ok("The note was successfully retrieved", note))
}

pub async fn update_note(
    State(state): State<AppState>,
    PathParam(note_id): PathParam<String>,
    JsonBody(req): JsonBody<NoteInput>,
) -> Result<ApiResponse<Note>, AppError> {
    // Rejected before any storage call.
    let patch = req.into_patch().map_err(AppError::bad_request)?;

    let note = state
        .notes
        .update_if_exists(&note_id, &patch)
        .await
        .map_err(|e| storage_failure("An error occurred while updating the note", "update", e))?;

    Ok(ApiResponse::ok("The note was successfully updated", note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    PathParam(note_id): PathParam<String>,
) -> Result<ApiResponse<()>, AppError> {
    state
        .notes
        .delete_if_exists(&note_id)
        .await
        .map_err(|e| storage_failure("An error occurred while deleting the note", "delete", e))?;

    Ok(ApiResponse::ok_without_data(
        "The note was successfully deleted",
    ))
}
