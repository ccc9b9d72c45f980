//! Feed handlers
//!
//! Serve the recency buffer as Atom. `/` and `/patch` publish patch bodies,
//! `/diff` publishes annotated diff bodies.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::domain::entities::BodyKind;
use crate::error::AppError;
use crate::feed::render_feed;
use crate::AppState;

const ATOM_CONTENT_TYPE: &str = "application/atom+xml; charset=utf-8";

fn atom_response(state: &AppState, kind: BodyKind, path: &str) -> Result<Response, AppError> {
    let items = state.buffer.snapshot();
    tracing::debug!(%kind, items = items.len(), "Rendering atom feed");
    let body = render_feed(&state.feed_meta, &items, kind, path)?;

    Ok(([(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)], body).into_response())
}

/// GET /
pub async fn get_feed(State(state): State<AppState>) -> Result<Response, AppError> {
    atom_response(&state, BodyKind::Patch, "/")
}

/// GET /patch
pub async fn get_patch_feed(State(state): State<AppState>) -> Result<Response, AppError> {
    atom_response(&state, BodyKind::Patch, "/patch")
}

/// GET /diff
pub async fn get_diff_feed(State(state): State<AppState>) -> Result<Response, AppError> {
    atom_response(&state, BodyKind::Diff, "/diff")
}
