use std::path::Path;

pub const MANIFEST_CONTENT_TYPE: &str = "application/x-mpegURL";
pub const SEGMENT_CONTENT_TYPE: &str = "video/MP2T";

/// Content type for a published file: playlists by extension, everything else is a segment.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("m3u8") => MANIFEST_CONTENT_TYPE,
        _ => SEGMENT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlists_are_manifests() {
        assert_eq!(content_type_for(Path::new("master.m3u8")), MANIFEST_CONTENT_TYPE);
        assert_eq!(
            content_type_for(Path::new("/tmp/processed_a/2/playlist.m3u8")),
            MANIFEST_CONTENT_TYPE
        );
    }

    #[test]
    fn test_everything_else_is_a_segment() {
        for name in ["0/segment0.ts", "segment12.ts", "notes.txt", "noext", "m3u8"] {
            assert_eq!(content_type_for(Path::new(name)), SEGMENT_CONTENT_TYPE, "{}", name);
        }
    }
}
