use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::Response,
};
use url::Url;

use crate::{
    Error, Result,
    guard::{OriginGuard, TargetUrl},
    hls,
    proxy::{PayloadKind, UpstreamResponse, relay},
    server::{params::ProxyParams, state::AppState},
    stream::{ManifestRewriter, RewriteContext, rules},
};

/// Handle GET / requests: validate, fetch, then rewrite or stream.
pub async fn handle_proxy(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    query: std::result::Result<Query<ProxyParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = query.map_err(|e| Error::InvalidUrl(e.body_text()))?;

    let target = OriginGuard::validate(params.url.as_deref(), state.allow_list())
        .inspect_err(|e| tracing::warn!("Rejected proxy request: {}", e))?;

    tracing::info!("Proxy request: {}", target);

    let proxy_base = proxy_base(&state, &uri, &headers)?;

    // A byte range on a manifest would hand the rewriter a partial playlist.
    let range = headers
        .get(header::RANGE)
        .filter(|_| !hls::has_playlist_extension(target.as_url()));

    let mut upstream = fetch(&state, &target, range).await?;

    // Only the content type revealed a playlist, and the range went upstream.
    if upstream.kind().is_playlist()
        && (range.is_some() || upstream.status() == StatusCode::PARTIAL_CONTENT)
    {
        tracing::debug!("Discarding ranged playlist body for {}, refetching", target);
        drop(upstream);
        upstream = fetch(&state, &target, None).await?;
    }

    if !upstream.is_success() {
        return Ok(relay::upstream_error(upstream));
    }

    match upstream.kind() {
        PayloadKind::Playlist => {
            let manifest_url = upstream.final_url().clone();
            let content = upstream.text().await?;

            let context = RewriteContext::new(manifest_url, proxy_base);
            let rewriter = ManifestRewriter::new(
                context,
                rules::default_rules(state.config.rewrite_tag_uris),
            );
            let rewritten = rewriter.rewrite(&content);

            tracing::debug!("Rewritten manifest for {}:\n{}", target, rewritten);

            Ok(relay::playlist(rewritten))
        }
        PayloadKind::Binary => {
            log_passthrough(&target, upstream.content_type());
            Ok(relay::passthrough(upstream))
        }
    }
}

async fn fetch(
    state: &AppState,
    target: &TargetUrl,
    range: Option<&HeaderValue>,
) -> Result<UpstreamResponse> {
    state.client.fetch(target, range).await.inspect_err(|e| {
        if e.is_upstream_unavailable() {
            tracing::error!("Upstream host {} unavailable for {}: {}", target.host(), target, e);
        } else {
            tracing::warn!("Upstream fetch for {} failed: {}", target, e);
        }
    })
}

/// Any method other than GET, HEAD or OPTIONS.
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

/// Public base URL of this proxy: the configured one, or one derived from
/// `X-Forwarded-Proto` and the request's host.
fn proxy_base(state: &AppState, uri: &Uri, headers: &HeaderMap) -> Result<Url> {
    if let Some(base) = &state.config.public_base_url {
        return Ok(base.clone());
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .ok_or_else(|| Error::InvalidUrl("cannot determine proxy origin: no Host".to_string()))?;

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| matches!(*s, "http" | "https"))
        .unwrap_or("http");

    Url::parse(&format!("{}://{}/", scheme, host))
        .map_err(|e| Error::InvalidUrl(format!("invalid Host {:?}: {}", host, e)))
}

fn log_passthrough(target: &TargetUrl, content_type: Option<&str>) {
    tracing::debug!(
        "Streaming {} ({})",
        target,
        content_type.unwrap_or(relay::DEFAULT_BINARY_CONTENT_TYPE)
    );
}
