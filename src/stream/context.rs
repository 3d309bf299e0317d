use crate::Result;
use url::Url;

/// Context for rewriting one manifest.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// URL the manifest was retrieved from; relative lines resolve against it.
    pub manifest_url: Url,

    /// Public base URL of this proxy.
    pub proxy_base: Url,
}

impl RewriteContext {
    pub fn new(manifest_url: Url, mut proxy_base: Url) -> Self {
        proxy_base.set_query(None);
        proxy_base.set_fragment(None);
        Self {
            manifest_url,
            proxy_base,
        }
    }

    /// Resolve a URI reference against the manifest URL.
    pub fn resolve_url(&self, reference: &str) -> Result<Url> {
        self.manifest_url.join(reference).map_err(Into::into)
    }

    /// Build `<proxy base>/?url=<percent-encoded target>`.
    pub fn build_proxy_url(&self, target: &Url) -> String {
        format!(
            "{}/?url={}",
            self.proxy_base.as_str().trim_end_matches('/'),
            urlencoding::encode(target.as_str())
        )
    }

    /// Resolve a reference and wrap it in a proxy URL. `None` if the
    /// reference cannot be resolved.
    pub fn proxy_reference(&self, reference: &str) -> Option<String> {
        match self.resolve_url(reference) {
            Ok(resolved) => Some(self.build_proxy_url(&resolved)),
            Err(e) => {
                tracing::debug!("Leaving unresolvable reference {:?}: {}", reference, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(proxy_base: &str) -> RewriteContext {
        RewriteContext::new(
            Url::parse("https://cdn.example/live/index.m3u8").unwrap(),
            Url::parse(proxy_base).unwrap(),
        )
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let ctx = context("https://proxy.test");
        assert_eq!(
            ctx.resolve_url("chunk1.ts").unwrap().as_str(),
            "https://cdn.example/live/chunk1.ts"
        );
        assert_eq!(
            ctx.resolve_url("/abs/chunk2.ts").unwrap().as_str(),
            "https://cdn.example/abs/chunk2.ts"
        );
        assert_eq!(
            ctx.resolve_url("../vod/a.ts?t=1").unwrap().as_str(),
            "https://cdn.example/vod/a.ts?t=1"
        );
        assert_eq!(
            ctx.resolve_url("https://other.example/seg.ts").unwrap().as_str(),
            "https://other.example/seg.ts"
        );
    }

    #[test]
    fn test_build_proxy_url_encodes_target() {
        let ctx = context("https://proxy.test/");
        let target = Url::parse("https://cdn.example/live/a.ts?token=x&y=1").unwrap();
        assert_eq!(
            ctx.build_proxy_url(&target),
            "https://proxy.test/?url=https%3A%2F%2Fcdn.example%2Flive%2Fa.ts%3Ftoken%3Dx%26y%3D1"
        );
    }

    #[test]
    fn test_proxy_base_with_path_and_query() {
        let ctx = context("https://proxy.test/hls/?url=stale");
        let target = Url::parse("https://cdn.example/a.ts").unwrap();
        assert_eq!(
            ctx.build_proxy_url(&target),
            "https://proxy.test/hls/?url=https%3A%2F%2Fcdn.example%2Fa.ts"
        );
    }

    #[test]
    fn test_proxy_reference_unresolvable() {
        let ctx = context("https://proxy.test");
        assert!(ctx.proxy_reference("http://[::1").is_none());
    }
}
