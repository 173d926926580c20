//! Advisory image validation.
//!
//! Validation never blocks a conversion. A failed check produces a
//! [`ValidationIssue`] that the caller logs before carrying on with the
//! original bytes.

use thiserror::Error;

use crate::media::MediaType;

/// What a successful header check learned about an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: MediaType,
    pub width: u32,
    pub height: u32,
}

/// Why an image failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("unrecognized image signature")]
    UnknownSignature,

    #[error("file is named as {declared} but contains {actual}")]
    FormatMismatch {
        declared: MediaType,
        actual: MediaType,
    },

    #[error("{0} header is truncated or malformed")]
    MalformedHeader(MediaType),

    #[error("image has zero width or height")]
    EmptyImage,
}

/// Checks that page data is a readable image.
pub trait ImageValidator: Send + Sync {
    /// Validate `data`, which was found under an extension mapping to `declared`.
    fn validate(&self, declared: MediaType, data: &[u8]) -> Result<ImageInfo, ValidationIssue>;
}

/// Validator that inspects magic bytes and header dimensions.
///
/// Supports JPEG, PNG, GIF, BMP and WebP without decoding pixel data.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderValidator;

impl ImageValidator for HeaderValidator {
    fn validate(&self, declared: MediaType, data: &[u8]) -> Result<ImageInfo, ValidationIssue> {
        let actual = MediaType::sniff(data).ok_or(ValidationIssue::UnknownSignature)?;
        if actual != declared {
            return Err(ValidationIssue::FormatMismatch { declared, actual });
        }

        let (width, height) =
            image_dimensions(actual, data).ok_or(ValidationIssue::MalformedHeader(actual))?;
        if width == 0 || height == 0 {
            return Err(ValidationIssue::EmptyImage);
        }

        Ok(ImageInfo {
            format: actual,
            width,
            height,
        })
    }
}

/// Extract `(width, height)` from the header of an image of known format.
pub fn image_dimensions(format: MediaType, data: &[u8]) -> Option<(u32, u32)> {
    match format {
        MediaType::Png => {
            // IHDR is always the first chunk
            if data.len() < 24 || &data[12..16] != b"IHDR" {
                return None;
            }
            let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
            let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
            Some((width, height))
        }
        MediaType::Gif => {
            if data.len() < 10 {
                return None;
            }
            let width = u16::from_le_bytes([data[6], data[7]]) as u32;
            let height = u16::from_le_bytes([data[8], data[9]]) as u32;
            Some((width, height))
        }
        MediaType::Bmp => {
            if data.len() < 26 {
                return None;
            }
            let width = i32::from_le_bytes([data[18], data[19], data[20], data[21]]);
            // Negative height marks a top-down bitmap
            let height = i32::from_le_bytes([data[22], data[23], data[24], data[25]]);
            Some((width.unsigned_abs(), height.unsigned_abs()))
        }
        MediaType::Jpeg => jpeg_dimensions(data),
        MediaType::WebP => webp_dimensions(data),
    }
}

/// Extract dimensions from JPEG data by walking markers to the first SOF.
fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF0-SOF15, excluding DHT (C4), JPG (C8) and DAC (CC)
        if matches!(
            marker,
            0xC0 | 0xC1 | 0xC2 | 0xC3 | 0xC5 | 0xC6 | 0xC7 | 0xC9 | 0xCA | 0xCB | 0xCD | 0xCE | 0xCF
        ) && i + 9 < data.len()
        {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some((width, height));
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + length;
    }
    None
}

fn webp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 30 {
        return None;
    }
    match &data[12..16] {
        b"VP8 " => {
            let width = u16::from_le_bytes([data[26], data[27]]) & 0x3FFF;
            let height = u16::from_le_bytes([data[28], data[29]]) & 0x3FFF;
            Some((width as u32, height as u32))
        }
        b"VP8L" => {
            let b = &data[21..25];
            let width = 1 + (((b[1] as u32 & 0x3F) << 8) | b[0] as u32);
            let height = 1
                + (((b[3] as u32 & 0x0F) << 10)
                    | ((b[2] as u32) << 2)
                    | ((b[1] as u32 & 0xC0) >> 6));
            Some((width, height))
        }
        b"VP8X" => {
            let width = 1 + u32::from_le_bytes([data[24], data[25], data[26], 0]);
            let height = 1 + u32::from_le_bytes([data[27], data[28], data[29], 0]);
            Some((width, height))
        }
        _ => None,
    }
}
