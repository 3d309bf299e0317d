use super::{LineType, RewriteContext, TransformRule};
use crate::hls::attributes;

/// Rewrites the quoted `URI` attribute of tags such as `#EXT-X-KEY` and
/// `#EXT-X-MAP`. Every other byte of the line is kept.
pub struct TagUriProxyRule;

impl TransformRule for TagUriProxyRule {
    fn matches(&self, line_type: &LineType, _context: &RewriteContext) -> bool {
        *line_type == LineType::UriTag
    }

    fn transform(&self, line: &str, context: &RewriteContext) -> String {
        let Some(colon) = line.find(':') else {
            return line.to_string();
        };
        let list_start = colon + 1;

        let Some(uri) = attributes::find(&line[list_start..], "URI") else {
            return line.to_string();
        };
        if !uri.quoted || uri.value.is_empty() {
            return line.to_string();
        }

        let Some(proxied) = context.proxy_reference(uri.value) else {
            return line.to_string();
        };

        let start = list_start + uri.value_span.start;
        let end = list_start + uri.value_span.end;

        let mut result = String::with_capacity(line.len() + proxied.len());
        result.push_str(&line[..start]);
        result.push_str(&proxied);
        result.push_str(&line[end..]);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn create_test_context() -> RewriteContext {
        RewriteContext::new(
            Url::parse("https://cdn.example.com/live/index.m3u8").unwrap(),
            Url::parse("https://proxy.test").unwrap(),
        )
    }

    #[test]
    fn test_matches_uri_tags() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        assert!(rule.matches(&LineType::UriTag, &context));
        assert!(!rule.matches(&LineType::Tag, &context));
        assert!(!rule.matches(&LineType::Uri, &context));
    }

    #[test]
    fn test_rewrite_key_uri() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        let line = r#"#EXT-X-KEY:METHOD=AES-128,URI="keys/k1.bin",IV=0x00000000000000000000000000000001"#;
        let result = rule.transform(line, &context);

        assert_eq!(
            result,
            "#EXT-X-KEY:METHOD=AES-128,\
             URI=\"https://proxy.test/?url=https%3A%2F%2Fcdn.example.com%2Flive%2Fkeys%2Fk1.bin\",\
             IV=0x00000000000000000000000000000001"
        );
    }

    #[test]
    fn test_rewrite_map_uri() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        let result = rule.transform(r#"#EXT-X-MAP:URI="/init.mp4",BYTERANGE="617@0""#, &context);

        assert_eq!(
            result,
            r#"#EXT-X-MAP:URI="https://proxy.test/?url=https%3A%2F%2Fcdn.example.com%2Finit.mp4",BYTERANGE="617@0""#
        );
    }

    #[test]
    fn test_key_without_uri_is_untouched() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        let line = "#EXT-X-KEY:METHOD=NONE";
        assert_eq!(rule.transform(line, &context), line);
    }
}
