use crate::hls;

/// Shape of a single M3U8 line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Empty,
    /// `#` line that is not an `#EXT` tag.
    Comment,
    Tag,
    /// Tag whose attribute list may embed a `URI="..."`.
    UriTag,
    Uri,
}

impl LineType {
    pub fn is_uri(&self) -> bool {
        matches!(self, Self::Uri)
    }
}

/// Classifier for M3U8 lines.
pub struct LineClassifier;

impl LineClassifier {
    /// Classify a line from an M3U8 playlist. Surrounding whitespace is
    /// ignored.
    pub fn classify(line: &str) -> LineType {
        let line = line.trim();

        if line.is_empty() {
            return LineType::Empty;
        }

        if !line.starts_with('#') {
            return LineType::Uri;
        }

        if hls::tag_carries_uri(line) {
            LineType::UriTag
        } else if line.starts_with("#EXT") {
            LineType::Tag
        } else {
            LineType::Comment
        }
    }
}
