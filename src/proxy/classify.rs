use url::Url;

use crate::hls;

/// How an upstream body is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Text manifest, rewritten before relaying.
    Playlist,
    /// Anything else, streamed through untouched.
    Binary,
}

impl PayloadKind {
    /// A response is a playlist if either the URL path has a playlist
    /// extension or the declared content type is an HLS manifest type.
    pub fn classify(url: &Url, content_type: Option<&str>) -> Self {
        if hls::has_playlist_extension(url) {
            return Self::Playlist;
        }

        if content_type.is_some_and(hls::is_playlist_content_type) {
            return Self::Playlist;
        }

        Self::Binary
    }

    pub fn is_playlist(&self) -> bool {
        matches!(self, Self::Playlist)
    }
}
