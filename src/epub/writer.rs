use std::collections::HashSet;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{
    CONTENT_ROOT, DEFAULT_COMPRESSION_LEVEL, KepubPackage, MIMETYPE, container_xml, content_opf,
    page_xhtml, toc_ncx,
};
use crate::error::{Error, Result};

/// A file to be written after `mimetype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Path inside the container.
    pub path: String,
    pub data: EntryData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryData {
    /// Generated in memory.
    Bytes(Vec<u8>),
    /// Staged image on disk, copied verbatim.
    File(PathBuf),
}

/// Build the ordered entry list for a package: pointer, package and
/// navigation documents, page documents, then images read from `images_dir`.
pub fn container_entries(package: &KepubPackage, images_dir: &Path) -> Vec<ContainerEntry> {
    let mut entries = Vec::with_capacity(package.pages.len() * 2 + 3);

    entries.push(ContainerEntry {
        path: "META-INF/container.xml".to_string(),
        data: EntryData::Bytes(container_xml().into_bytes()),
    });
    entries.push(ContainerEntry {
        path: format!("{CONTENT_ROOT}/content.opf"),
        data: EntryData::Bytes(content_opf(package).into_bytes()),
    });
    entries.push(ContainerEntry {
        path: format!("{CONTENT_ROOT}/toc.ncx"),
        data: EntryData::Bytes(toc_ncx(package).into_bytes()),
    });

    for page in &package.pages {
        entries.push(ContainerEntry {
            path: format!("{CONTENT_ROOT}/{}", page.document_name()),
            data: EntryData::Bytes(page_xhtml(page).into_bytes()),
        });
    }
    for page in &package.pages {
        entries.push(ContainerEntry {
            path: format!("{CONTENT_ROOT}/{}", page.image_href()),
            data: EntryData::File(images_dir.join(&page.canonical_name)),
        });
    }

    entries
}

/// Write a KEPUB container to any [`Write`] + [`Seek`] destination.
///
/// `mimetype` goes first and uncompressed; every other entry is deflated at
/// `compression_level` (default 6). Level 0 stores entries uncompressed.
/// Returns the writer once the archive is finished.
pub fn write_kepub_to_writer<W: Write + Seek>(
    package: &KepubPackage,
    images_dir: &Path,
    writer: W,
    compression_level: Option<i64>,
) -> Result<W> {
    let mut zip = ZipWriter::new(writer);

    // Fixed timestamps keep output reproducible
    let stored = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default());
    let deflated = match compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL) {
        0 => stored,
        level => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level))
            .last_modified_time(DateTime::default()),
    };

    // 1. mimetype (must be first, uncompressed)
    zip.start_file("mimetype", stored)?;
    zip.write_all(MIMETYPE.as_bytes())?;

    // 2. everything else, each path at most once
    let mut seen = HashSet::new();
    for entry in container_entries(package, images_dir) {
        if !seen.insert(entry.path.clone()) {
            return Err(Error::DuplicateEntry(entry.path));
        }

        zip.start_file(entry.path.as_str(), deflated)?;
        match &entry.data {
            EntryData::Bytes(bytes) => zip.write_all(bytes)?,
            EntryData::File(path) => zip.write_all(&fs::read(path)?)?,
        }
        debug!(entry = %entry.path, "added to container");
    }

    Ok(zip.finish()?)
}

/// Write a KEPUB container to `path`, replacing any existing file.
///
/// The archive is assembled in a temporary file next to `path` and moved into
/// place only once complete, so a failed run never leaves partial output.
pub fn write_kepub(
    package: &KepubPackage,
    images_dir: &Path,
    path: &Path,
    compression_level: Option<i64>,
) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".cbr2kepub-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(Error::write(parent))?;

    write_kepub_to_writer(package, images_dir, &mut temp, compression_level)?;
    temp.as_file().sync_all().map_err(Error::write(path))?;
    temp.persist(path).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    info!(output = %path.display(), pages = package.pages.len(), "wrote container");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{BookIdentity, SequentialIds};
    use crate::pages::assign_pages;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn staged_package(dir: &Path) -> KepubPackage {
        let pages = assign_pages(vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]);
        for page in &pages {
            fs::write(dir.join(&page.canonical_name), page.canonical_name.as_bytes()).unwrap();
        }
        KepubPackage::new(BookIdentity::generate("Book", &SequentialIds::new()), pages)
    }

    #[test]
    fn test_mimetype_first_and_stored() {
        let dir = tempfile::tempdir().unwrap();
        let package = staged_package(dir.path());

        let cursor = write_kepub_to_writer(&package, dir.path(), Cursor::new(Vec::new()), None)
            .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, "application/epub+zip");
        drop(first);

        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());

        let image = archive.by_name("OEBPS/Images/page_0002.png").unwrap();
        assert_eq!(image.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_level_zero_stores_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let package = staged_package(dir.path());

        let cursor = write_kepub_to_writer(&package, dir.path(), Cursor::new(Vec::new()), Some(0))
            .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

        assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");
        for i in 0..archive.len() {
            let entry = archive.by_index(i).unwrap();
            assert_eq!(entry.compression(), CompressionMethod::Stored, "{}", entry.name());
        }
        let mut image = Vec::new();
        archive
            .by_name("OEBPS/Images/page_0001.jpg")
            .unwrap()
            .read_to_end(&mut image)
            .unwrap();
        assert_eq!(image, b"page_0001.jpg");
    }

    #[test]
    fn test_entry_order() {
        let dir = tempfile::tempdir().unwrap();
        let package = staged_package(dir.path());
        let paths: Vec<_> = container_entries(&package, dir.path())
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(
            paths,
            [
                "META-INF/container.xml",
                "OEBPS/content.opf",
                "OEBPS/toc.ncx",
                "OEBPS/page_0001.xhtml",
                "OEBPS/page_0002.xhtml",
                "OEBPS/Images/page_0001.jpg",
                "OEBPS/Images/page_0002.png",
            ]
        );
    }

    #[test]
    fn test_duplicate_pages_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut package = staged_package(dir.path());
        let dup = package.pages[0].clone();
        package.pages.push(dup);

        let err = write_kepub_to_writer(&package, dir.path(), Cursor::new(Vec::new()), None)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry(path) if path == "OEBPS/page_0001.xhtml"));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let package = staged_package(dir.path());
        let output = dir.path().join("out.kepub.epub");
        fs::write(&output, b"stale").unwrap();

        write_kepub(&package, dir.path(), &output, Some(9)).unwrap();

        let archive = ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 8);
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_failed_write_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let package = staged_package(dir.path());
        let output = dir.path().join("out.kepub.epub");

        // images are looked up in an empty directory
        let missing = dir.path().join("missing");
        let err = write_kepub(&package, &missing, &output, None).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!output.exists());
    }
}
