use super::{LineType, RewriteContext, TransformRule};

/// Rewrites bare URI lines (segments and variant playlists alike) to go
/// through the proxy.
pub struct UriLineProxyRule;

impl TransformRule for UriLineProxyRule {
    fn matches(&self, line_type: &LineType, _context: &RewriteContext) -> bool {
        line_type.is_uri()
    }

    fn transform(&self, line: &str, context: &RewriteContext) -> String {
        context
            .proxy_reference(line.trim())
            .unwrap_or_else(|| line.to_string())
    }
}
