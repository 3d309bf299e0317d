pub mod tag_uri;
pub mod uri_line;

use super::{classifier::LineType, context::RewriteContext};

pub use tag_uri::TagUriProxyRule;
pub use uri_line::UriLineProxyRule;

/// A rewrite applied to single manifest lines.
///
/// Rules map exactly one input line to one output line so the positional
/// pairing of tags and URIs survives rewriting.
pub trait TransformRule: Send + Sync {
    /// Check if this rule should be applied.
    fn matches(&self, line_type: &LineType, context: &RewriteContext) -> bool;

    /// Transform the line.
    fn transform(&self, line: &str, context: &RewriteContext) -> String;
}

/// Rules used by the proxy. Attribute rewriting is opt-in.
pub fn default_rules(rewrite_tag_uris: bool) -> Vec<Box<dyn TransformRule>> {
    let mut rules: Vec<Box<dyn TransformRule>> = vec![Box::new(UriLineProxyRule)];
    if rewrite_tag_uris {
        rules.push(Box::new(TagUriProxyRule));
    }
    rules
}
