//! KEPUB container generation.
//!
//! Layout of a written container:
//!
//! ```text
//! mimetype                  (first, stored)
//! META-INF/container.xml
//! OEBPS/content.opf
//! OEBPS/toc.ncx
//! OEBPS/page_NNNN.xhtml     (one per page)
//! OEBPS/Images/page_NNNN.*  (one per page)
//! ```

mod package;
mod page;
mod writer;

pub use package::{
    ManifestEntry, NavPoint, SpineEntry, container_xml, content_opf, manifest_entries, nav_points,
    spine_entries, toc_ncx,
};
pub use page::page_xhtml;
pub use writer::{ContainerEntry, EntryData, container_entries, write_kepub, write_kepub_to_writer};

use crate::ident::BookIdentity;
use crate::pages::Page;

/// Content of the `mimetype` entry.
pub const MIMETYPE: &str = "application/epub+zip";

/// Directory inside the container holding the package and its resources.
pub const CONTENT_ROOT: &str = "OEBPS";

/// Default deflate level for everything except `mimetype`.
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

/// Everything needed to generate the control and page documents.
#[derive(Debug, Clone)]
pub struct KepubPackage {
    pub identity: BookIdentity,
    /// Value of `dc:language`.
    pub language: String,
    /// Pages in reading order. Must not be empty.
    pub pages: Vec<Page>,
}

impl KepubPackage {
    pub fn new(identity: BookIdentity, pages: Vec<Page>) -> Self {
        Self {
            identity,
            language: "en".to_string(),
            pages,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
