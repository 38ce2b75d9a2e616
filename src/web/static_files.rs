//! Embedded status page.
//!
//! The page lives in `web/` and is compiled into the binary, so the meter
//! runs with no files beside it.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

/// Embedded static files for the status page.
#[derive(Embed)]
#[folder = "web"]
pub struct StaticAssets;

/// GET / - the status page.
pub async fn serve_index() -> Response {
    serve_file("index.html")
}

/// Serves any other embedded file by path, or 404.
pub async fn serve_static(request: Request) -> Response {
    let path = request.uri().path().trim_start_matches('/');
    if path.is_empty() {
        return serve_file("index.html");
    }
    serve_file(path)
}

/// Serves a specific file from embedded assets.
fn serve_file(path: &str) -> Response {
    match StaticAssets::get(path) {
        Some(content) => file_response(path, content.data.as_ref()),
        None => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

/// Creates an HTTP response for a file with appropriate content type.
fn file_response(path: &str, content: &[u8]) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "no-cache, must-revalidate")
        .body(Body::from(content.to_vec()))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create response",
            )
                .into_response()
        })
}
