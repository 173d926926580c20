//! # cbr2kepub
//!
//! Convert comic book archives into Kobo KEPUB ebooks without touching the
//! images.
//!
//! ## Features
//!
//! - Reads ZIP-based archives (CBZ, and the many CBR files that are really
//!   ZIPs) in-process, and true RAR archives through `unrar`
//! - Orders pages by their full path inside the archive and renames them
//!   `page_0001.jpg`, `page_0002.png`, ...
//! - Writes an EPUB 2 package with Kobo `book-id`/`content-id` metadata, one
//!   XHTML wrapper per page and a flat NCX table of contents
//! - Output is written atomically: a failed run leaves nothing behind
//!
//! ## Quick Start
//!
//! ```no_run
//! use cbr2kepub::convert;
//! use std::path::Path;
//!
//! // Writes "Saga 01.kepub.epub" next to the input
//! let output = convert(Path::new("Saga 01.cbr"), None)?;
//! # Ok::<(), cbr2kepub::Error>(())
//! ```
//!
//! ## Building a container directly
//!
//! ```no_run
//! use cbr2kepub::{BookIdentity, KepubPackage, SequentialIds, assign_pages, write_kepub_to_writer};
//! use std::io::Cursor;
//! use std::path::{Path, PathBuf};
//!
//! let pages = assign_pages(vec![PathBuf::from("001.jpg"), PathBuf::from("002.jpg")]);
//! let identity = BookIdentity::generate("My Comic", &SequentialIds::new());
//! let package = KepubPackage::new(identity, pages);
//!
//! // Images must already be staged as `staged/page_0001.jpg`, ...
//! let bytes = write_kepub_to_writer(&package, Path::new("staged"), Cursor::new(Vec::new()), None)?
//!     .into_inner();
//! # Ok::<(), cbr2kepub::Error>(())
//! ```

pub mod archive;
pub mod convert;
pub mod epub;
pub mod error;
pub mod ident;
pub mod media;
pub mod pages;
pub mod validate;

pub use archive::{ArchiveKind, extract_archive};
pub use convert::{ConvertConfig, Converter, convert, default_output_path};
pub use epub::{KepubPackage, write_kepub, write_kepub_to_writer};
pub use error::{Error, Result};
pub use ident::{BookIdentity, IdGenerator, SequentialIds, UuidGenerator};
pub use media::MediaType;
pub use pages::{Page, assign_pages, collect_pages};
pub use validate::{HeaderValidator, ImageValidator, ValidationIssue};
