//! Image media types recognized as comic pages.

use std::fmt;
use std::path::Path;

/// Image format of a page resource.
///
/// The mapping from extension to MIME type is a fixed table. Extensions
/// outside the table fall back to [`MediaType::Jpeg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
}

impl MediaType {
    /// Look up a recognized page extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "gif" => Some(MediaType::Gif),
            "bmp" => Some(MediaType::Bmp),
            "webp" => Some(MediaType::WebP),
            _ => None,
        }
    }

    /// Media type for a file path, defaulting to JPEG for anything unrecognized.
    pub fn for_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(MediaType::Jpeg)
    }

    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::Bmp => "image/bmp",
            MediaType::WebP => "image/webp",
        }
    }

    /// Identify an image from its leading magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(MediaType::Jpeg);
        }
        if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(MediaType::Png);
        }
        if data.starts_with(b"GIF8") {
            return Some(MediaType::Gif);
        }
        if data.starts_with(b"BM") {
            return Some(MediaType::Bmp);
        }
        // RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(MediaType::WebP);
        }
        None
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Whether a path carries one of the recognized page image extensions.
pub fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(MediaType::from_extension)
        .is_some()
}
