use url::Url;

/// Media type served for every rewritten manifest.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Content types upstreams use for HLS manifests.
const PLAYLIST_CONTENT_TYPES: &[&str] = &[
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpegurl",
    "audio/x-mpegurl",
];

const PLAYLIST_EXTENSIONS: &[&str] = &["m3u8", "m3u"];

/// Tags whose attribute list may carry a `URI` attribute.
const URI_TAGS: &[&str] = &[
    "#EXT-X-KEY:",
    "#EXT-X-SESSION-KEY:",
    "#EXT-X-MAP:",
    "#EXT-X-MEDIA:",
    "#EXT-X-I-FRAME-STREAM-INF:",
    "#EXT-X-PART:",
    "#EXT-X-PRELOAD-HINT:",
    "#EXT-X-RENDITION-REPORT:",
    "#EXT-X-SESSION-DATA:",
];

/// Whether the URL path ends in `.m3u8` or `.m3u` (query ignored).
pub fn has_playlist_extension(url: &Url) -> bool {
    let path = url.path();
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rsplit_once('.').is_some_and(|(_, ext)| {
        PLAYLIST_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Whether a `Content-Type` header value names an HLS manifest.
/// Parameters such as `charset` are ignored.
pub fn is_playlist_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    PLAYLIST_CONTENT_TYPES
        .iter()
        .any(|known| essence.eq_ignore_ascii_case(known))
}

/// Whether a tag line is one that may embed a URI attribute.
pub fn tag_carries_uri(line: &str) -> bool {
    URI_TAGS.iter().any(|tag| line.starts_with(tag))
}
