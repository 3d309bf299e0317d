//! Building the responses sent back to the player.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};

use super::client::UpstreamResponse;
use crate::hls::PLAYLIST_CONTENT_TYPE;

/// Content type used when the upstream does not declare one.
pub const DEFAULT_BINARY_CONTENT_TYPE: &str = "application/octet-stream";

const NO_STORE: &str = "no-store";

/// Upstream headers relayed alongside a streamed body.
fn forwarded_headers() -> [HeaderName; 3] {
    [
        header::CONTENT_LENGTH,
        header::CONTENT_RANGE,
        header::ACCEPT_RANGES,
    ]
}

/// Response for a rewritten manifest.
pub fn playlist(body: String) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(PLAYLIST_CONTENT_TYPE),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE)),
        ],
        body,
    )
        .into_response()
}

/// Stream an upstream body through unchanged, keeping its status code.
///
/// Used for binary segments and for non-2xx upstream responses alike.
pub fn passthrough(upstream: UpstreamResponse) -> Response {
    let status = upstream.status();
    let headers = relayed_headers(upstream.headers());
    let body = Body::from_stream(upstream.bytes_stream());

    (status, headers, body).into_response()
}

/// Relay a non-2xx upstream response.
pub fn upstream_error(upstream: UpstreamResponse) -> Response {
    tracing::info!(
        "Relaying upstream status {} for {}",
        upstream.status(),
        upstream.requested_url()
    );
    passthrough(upstream)
}

fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let content_type = upstream
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_BINARY_CONTENT_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));

    for name in forwarded_headers() {
        if let Some(value) = upstream.get(&name) {
            headers.insert(name, value.clone());
        }
    }

    headers
}
