use super::{
    classifier::LineClassifier,
    context::RewriteContext,
    rules::{self, TransformRule},
};

/// Line-based HLS manifest rewriter.
///
/// Output has exactly as many lines as the input, in the same order. Line
/// endings are normalized to `\n`. The result depends only on the input text
/// and the context, so rewriting is deterministic.
pub struct ManifestRewriter {
    context: RewriteContext,
    rules: Vec<Box<dyn TransformRule>>,
}

impl ManifestRewriter {
    pub fn new(context: RewriteContext, rules: Vec<Box<dyn TransformRule>>) -> Self {
        Self { context, rules }
    }

    /// Rewriter with the default rule set: bare URI lines only.
    pub fn with_default_rules(context: RewriteContext) -> Self {
        Self::new(context, rules::default_rules(false))
    }

    /// Rewrite an entire manifest.
    pub fn rewrite(&self, input: &str) -> String {
        input
            .split('\n')
            .map(|line| self.rewrite_line(line.strip_suffix('\r').unwrap_or(line)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rewrite a single line, without its line terminator.
    pub fn rewrite_line(&self, line: &str) -> String {
        let line_type = LineClassifier::classify(line);

        self.rules
            .iter()
            .find(|rule| rule.matches(&line_type, &self.context))
            .map(|rule| rule.transform(line, &self.context))
            .unwrap_or_else(|| line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn rewriter(manifest_url: &str) -> ManifestRewriter {
        ManifestRewriter::with_default_rules(RewriteContext::new(
            Url::parse(manifest_url).unwrap(),
            Url::parse("https://proxy.test").unwrap(),
        ))
    }

    #[test]
    fn test_rewrites_media_playlist() {
        let input = "#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:10.0,\nseg1.ts\n#EXTINF:10.0,\nseg2.ts";
        let output = rewriter("https://video.tpa.ao/live/index.m3u8").rewrite(input);

        let expected = "#EXTM3U\n\
                        #EXT-X-VERSION:3\n\
                        #EXTINF:10.0,\n\
                        https://proxy.test/?url=https%3A%2F%2Fvideo.tpa.ao%2Flive%2Fseg1.ts\n\
                        #EXTINF:10.0,\n\
                        https://proxy.test/?url=https%3A%2F%2Fvideo.tpa.ao%2Flive%2Fseg2.ts";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_relative_resolution() {
        let rw = rewriter("https://cdn.example/live/index.m3u8");

        assert_eq!(
            rw.rewrite_line("chunk1.ts"),
            "https://proxy.test/?url=https%3A%2F%2Fcdn.example%2Flive%2Fchunk1.ts"
        );
        assert_eq!(
            rw.rewrite_line("/abs/chunk2.ts"),
            "https://proxy.test/?url=https%3A%2F%2Fcdn.example%2Fabs%2Fchunk2.ts"
        );
        assert_eq!(
            rw.rewrite_line("https://other.example/seg.ts"),
            "https://proxy.test/?url=https%3A%2F%2Fother.example%2Fseg.ts"
        );
    }

    #[test]
    fn test_rewriting_is_deterministic() {
        let input = "#EXTM3U\n#EXTINF:4,\na.ts\n#EXTINF:4,\nhttps://other.example/b.ts\n";
        let rw = rewriter("https://cdn.example/live/index.m3u8");

        assert_eq!(rw.rewrite(input), rw.rewrite(input));
    }

    #[test]
    fn test_preserves_directives_blanks_and_line_count() {
        let input = "#EXTM3U\n\n# plain comment\n#EXT-X-KEY:METHOD=AES-128,URI=\"k.bin\"\n  \n#EXTINF:6,\nseg.ts\n";
        let output = rewriter("https://cdn.example/live/index.m3u8").rewrite(input);

        let in_lines: Vec<&str> = input.split('\n').collect();
        let out_lines: Vec<&str> = output.split('\n').collect();
        assert_eq!(in_lines.len(), out_lines.len());

        for (before, after) in in_lines.iter().zip(&out_lines) {
            if before.trim().is_empty() || before.starts_with('#') {
                assert_eq!(before, after);
            }
        }
        assert!(out_lines[6].starts_with("https://proxy.test/?url="));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_normalizes_crlf() {
        let output = rewriter("https://cdn.example/live/index.m3u8").rewrite("#EXTM3U\r\n#EXTINF:6,\r\nseg.ts\r\n");

        assert_eq!(
            output,
            "#EXTM3U\n#EXTINF:6,\nhttps://proxy.test/?url=https%3A%2F%2Fcdn.example%2Flive%2Fseg.ts\n"
        );
    }

    #[test]
    fn test_master_playlist_variants_are_rewritten() {
        let input = "#EXTM3U\n\
                     #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
                     360p/index.m3u8\n\
                     #EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1280x720\n\
                     https://cdn2.example/720p/index.m3u8";
        let output = rewriter("https://cdn.example/master.m3u8").rewrite(input);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360");
        assert_eq!(
            lines[2],
            "https://proxy.test/?url=https%3A%2F%2Fcdn.example%2F360p%2Findex.m3u8"
        );
        assert_eq!(
            lines[4],
            "https://proxy.test/?url=https%3A%2F%2Fcdn2.example%2F720p%2Findex.m3u8"
        );
    }

    #[test]
    fn test_malformed_line_is_left_in_place() {
        let input = "#EXTINF:6,\nhttp://[::1\n#EXTINF:6,\nok.ts";
        let output = rewriter("https://cdn.example/live/index.m3u8").rewrite(input);
        let lines: Vec<&str> = output.split('\n').collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "http://[::1");
        assert!(lines[3].starts_with("https://proxy.test/?url="));
    }

    #[test]
    fn test_tag_uris_rewritten_when_enabled() {
        let rw = ManifestRewriter::new(
            RewriteContext::new(
                Url::parse("https://cdn.example/live/index.m3u8").unwrap(),
                Url::parse("https://proxy.test").unwrap(),
            ),
            rules::default_rules(true),
        );
        let input = "#EXT-X-MAP:URI=\"init.mp4\"\n#EXTINF:6,\nseg.m4s";
        let output = rw.rewrite(input);
        let lines: Vec<&str> = output.split('\n').collect();

        assert_eq!(
            lines[0],
            "#EXT-X-MAP:URI=\"https://proxy.test/?url=https%3A%2F%2Fcdn.example%2Flive%2Finit.mp4\""
        );
        assert_eq!(lines[1], "#EXTINF:6,");
        assert!(lines[2].ends_with("%2Flive%2Fseg.m4s"));
    }
}
