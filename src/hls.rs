pub mod attributes;
pub mod playlist;

pub use attributes::Attribute;
pub use playlist::{
    PLAYLIST_CONTENT_TYPE, has_playlist_extension, is_playlist_content_type, tag_carries_uri,
};
