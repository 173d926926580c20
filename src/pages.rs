//! Page discovery and canonical naming.
//!
//! Pages are ordered by their relative path inside the extracted archive,
//! compared component by component. A directory sorts by its own name, so
//! `Chapter 1/` comes before `Chapter 1.5/` and `a/2.jpg` before `a-b.jpg`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::media::{MediaType, is_page_image};
use crate::validate::ImageValidator;

/// One page of the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Path of the source image relative to the extraction root.
    pub original_path: PathBuf,
    /// 1-based position in reading order.
    pub sequence_index: usize,
    /// `page_NNNN.ext` with the original extension lowercased.
    pub canonical_name: String,
    pub media_type: MediaType,
}

impl Page {
    /// Name of the wrapper document for this page, e.g. `page_0001.xhtml`.
    pub fn document_name(&self) -> String {
        format!("page_{:04}.xhtml", self.sequence_index)
    }

    /// Manifest id of the wrapper document.
    pub fn document_id(&self) -> String {
        format!("page_{}", self.sequence_index)
    }

    /// Href of the image relative to the content root.
    pub fn image_href(&self) -> String {
        format!("Images/{}", self.canonical_name)
    }

    /// Manifest id of the image resource.
    pub fn image_id(&self) -> String {
        format!("img_{}", self.canonical_name)
    }

    /// Human-readable label, also used as the image fallback text.
    pub fn label(&self) -> String {
        format!("Page {}", self.sequence_index)
    }
}

/// Find every page image under `root`, in reading order.
///
/// Returned paths are relative to `root`. Fails with
/// [`Error::NoPagesFound`] when nothing qualifies.
pub fn collect_pages(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_image_files(root, root, &mut files)?;

    if files.is_empty() {
        return Err(Error::NoPagesFound);
    }

    files.sort();
    Ok(files)
}

fn collect_image_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Symlinked directories are not followed; symlinked files are
        if entry.file_type()?.is_dir() {
            collect_image_files(root, &path, out)?;
            continue;
        }
        if path.is_file()
            && is_page_image(&path)
            && let Ok(relative) = path.strip_prefix(root)
        {
            out.push(relative.to_path_buf());
        }
    }
    Ok(())
}

/// `page_{index:04}{ext}` with the extension lowercased.
///
/// Indices past 9999 simply grow wider.
pub fn canonical_name(index: usize, original: &Path) -> String {
    let ext = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    format!("page_{:04}{}", index, ext)
}

/// Assign sequence indices and canonical names to ordered page files.
pub fn assign_pages(files: Vec<PathBuf>) -> Vec<Page> {
    files
        .into_iter()
        .enumerate()
        .map(|(i, original_path)| {
            let sequence_index = i + 1;
            let page = Page {
                canonical_name: canonical_name(sequence_index, &original_path),
                media_type: MediaType::for_path(&original_path),
                sequence_index,
                original_path,
            };
            debug!(
                page = page.sequence_index,
                from = %page.original_path.display(),
                to = %page.canonical_name,
                "assigned page"
            );
            page
        })
        .collect()
}

/// Copy each page's bytes from `source_root` into `images_dir` under its
/// canonical name.
///
/// Content is copied unchanged. When a validator is given, problems it finds
/// are logged and the page is kept.
pub fn stage_pages(
    pages: &[Page],
    source_root: &Path,
    images_dir: &Path,
    validator: Option<&dyn ImageValidator>,
) -> Result<()> {
    fs::create_dir_all(images_dir).map_err(Error::write(images_dir))?;

    for page in pages {
        let data = fs::read(source_root.join(&page.original_path))?;

        if let Some(validator) = validator {
            match validator.validate(page.media_type, &data) {
                Ok(info) => debug!(
                    page = %page.canonical_name,
                    width = info.width,
                    height = info.height,
                    "validated image"
                ),
                Err(issue) => warn!(
                    page = %page.original_path.display(),
                    "could not validate image: {issue}"
                ),
            }
        }

        let target = images_dir.join(&page.canonical_name);
        fs::write(&target, &data).map_err(Error::write(&target))?;
    }
    Ok(())
}
