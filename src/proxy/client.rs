use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::{Client, redirect};
use url::Url;

use super::classify::PayloadKind;
use crate::{Error, Result, config::ProxyConfig, guard::{AllowList, TargetUrl}};

const MAX_REDIRECTS: usize = 10;

/// HTTP client for fetching upstream resources.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
}

impl ProxyClient {
    /// Build a client from the process configuration.
    ///
    /// Redirects are only followed towards allow-listed hosts; any other
    /// redirect is returned to the caller as-is. Upstreams are always
    /// contacted directly, ignoring `HTTP_PROXY` and friends.
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.upstream_timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(redirect_policy(config.allow_list.clone()))
            .no_proxy()
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Issue a GET for a validated target. Only a `Range` header is carried
    /// over from the caller; cookies and credentials never are.
    pub async fn fetch(
        &self,
        target: &TargetUrl,
        range: Option<&HeaderValue>,
    ) -> Result<UpstreamResponse> {
        let mut request = self.client.get(target.as_url().clone());

        if let Some(range) = range {
            request = request.header(header::RANGE, range.clone());
        }

        let response = request.send().await?;

        tracing::debug!(
            "Upstream responded {} for {} (final URL {})",
            response.status(),
            target,
            response.url()
        );

        Ok(UpstreamResponse::new(target.as_url().clone(), response))
    }
}

fn redirect_policy(allow_list: AllowList) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }

        let allowed = matches!(attempt.url().scheme(), "http" | "https")
            && attempt
                .url()
                .host_str()
                .is_some_and(|host| allow_list.contains(host));

        if allowed {
            attempt.follow()
        } else {
            tracing::warn!("Not following redirect to {}", attempt.url());
            attempt.stop()
        }
    })
}

/// An upstream response whose body has not been consumed yet.
pub struct UpstreamResponse {
    requested_url: Url,
    response: reqwest::Response,
}

impl UpstreamResponse {
    fn new(requested_url: Url, response: reqwest::Response) -> Self {
        Self {
            requested_url,
            response,
        }
    }

    /// URL the proxy was asked to fetch.
    pub fn requested_url(&self) -> &Url {
        &self.requested_url
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn is_success(&self) -> bool {
        self.response.status().is_success()
    }

    /// URL the body was actually served from, after redirects.
    pub fn final_url(&self) -> &Url {
        self.response.url()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn kind(&self) -> PayloadKind {
        PayloadKind::classify(&self.requested_url, self.content_type())
    }

    /// Read the whole body as text.
    pub async fn text(self) -> Result<String> {
        Ok(self.response.text().await?)
    }

    /// Body as a byte stream. Dropping the stream aborts the transfer.
    pub fn bytes_stream(self) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        let url = self.response.url().clone();
        self.response
            .bytes_stream()
            .map_err(Error::from)
            .inspect_err(move |e| tracing::warn!("Upstream body for {} failed: {}", url, e))
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status())
            .field("url", &self.final_url().as_str())
            .finish()
    }
}
