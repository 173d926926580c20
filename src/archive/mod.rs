//! Comic archive extraction.
//!
//! Comic archives named `.cbr` are frequently ZIP files under another name, so
//! the container format is detected from magic bytes rather than the
//! extension. ZIP archives are unpacked in-process; RAR archives are handed to
//! the platform `unrar` tool.

mod cbz;
mod rar;

pub use cbz::CbzExtractor;
pub use rar::{UNRAR_INSTALL_GUIDANCE, UnrarExtractor};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

/// Unpacks an archive into a destination directory.
pub trait Extractor {
    /// Extract every entry of `archive` beneath `dest`, creating it if needed.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Container format of a comic archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
    Unknown,
}

impl ArchiveKind {
    /// Classify an archive by its leading bytes.
    pub fn detect(header: &[u8]) -> Self {
        if header.starts_with(b"PK") {
            ArchiveKind::Zip
        } else if header.starts_with(b"Rar!") || header.starts_with(b"RAR ") {
            ArchiveKind::Rar
        } else {
            ArchiveKind::Unknown
        }
    }

    /// Read the first bytes of a file and classify it.
    pub fn sniff_file(path: &Path) -> Result<Self> {
        let mut header = Vec::with_capacity(8);
        File::open(path)?.take(8).read_to_end(&mut header)?;
        Ok(Self::detect(&header))
    }
}

/// Extract a comic archive into `dest`, picking the extractor by content.
pub fn extract_archive(archive: &Path, dest: &Path, unrar: &UnrarExtractor) -> Result<ArchiveKind> {
    let kind = ArchiveKind::sniff_file(archive)?;
    info!(archive = %archive.display(), ?kind, "extracting");

    match kind {
        ArchiveKind::Zip => CbzExtractor.extract(archive, dest)?,
        ArchiveKind::Rar => unrar.extract(archive, dest)?,
        ArchiveKind::Unknown => {
            return Err(Error::UnsupportedArchive(format!(
                "{} is neither a ZIP nor a RAR archive",
                archive.display()
            )));
        }
    }
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_archive_kind() {
        assert_eq!(ArchiveKind::detect(b"PK\x03\x04"), ArchiveKind::Zip);
        assert_eq!(ArchiveKind::detect(b"Rar!\x1a\x07\x01\x00"), ArchiveKind::Rar);
        assert_eq!(ArchiveKind::detect(b"RAR \x00"), ArchiveKind::Rar);
        assert_eq!(ArchiveKind::detect(b"7z\xbc\xaf"), ArchiveKind::Unknown);
        assert_eq!(ArchiveKind::detect(b""), ArchiveKind::Unknown);
    }

    #[test]
    fn test_unknown_archive_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.cbr");
        std::fs::write(&input, b"just some text").unwrap();

        let err = extract_archive(&input, &dir.path().join("out"), &UnrarExtractor::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedArchive(_)));
    }
}
