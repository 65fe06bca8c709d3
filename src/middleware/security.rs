// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Add security headers to all responses.
///
/// The CSP allows same-origin resources so the `/app/` pages can load
/// their own scripts and styles.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'"),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    response
}

/// Whether any path segment names a hidden file, including a
/// percent-encoded leading dot.
fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("%2e"))
    })
}

/// Answer 404 for dotfiles and dot-directories under the static file server.
pub async fn reject_hidden_files(req: Request, next: Next) -> Response {
    if is_hidden_path(req.uri().path()) {
        tracing::warn!(path = %req.uri().path(), "Refused hidden file request");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}
