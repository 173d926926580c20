//! End-to-end conversion of a comic archive into a KEPUB file.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use crate::archive::{UnrarExtractor, extract_archive};
use crate::epub::{KepubPackage, write_kepub};
use crate::error::{Error, Result};
use crate::ident::{BookIdentity, IdGenerator, UuidGenerator};
use crate::pages::{Page, assign_pages, collect_pages, stage_pages};
use crate::validate::{HeaderValidator, ImageValidator};

/// Configuration for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Output path. Defaults to `<input-stem>.kepub.epub` beside the input.
    pub output: Option<PathBuf>,
    /// Deflate level (0-9, default 6) for everything except `mimetype`.
    pub compression_level: Option<i64>,
    /// Value of `dc:language`.
    pub language: String,
    /// Run the image validator over each page (advisory only).
    pub validate_images: bool,
    /// `unrar` executable for RAR archives; `unrar` on `PATH` when unset.
    pub unrar_program: Option<PathBuf>,
    /// Parent of the per-run scratch directory; the system temp dir when unset.
    pub scratch_parent: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output: None,
            compression_level: None,
            language: "en".to_string(),
            validate_images: true,
            unrar_program: None,
            scratch_parent: None,
        }
    }
}

impl ConvertConfig {
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = Some(level);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_images = validate;
        self
    }

    pub fn with_unrar_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.unrar_program = Some(program.into());
        self
    }

    pub fn with_scratch_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(dir.into());
        self
    }
}

/// Comic archive to KEPUB converter.
///
/// # Example
///
/// ```no_run
/// use cbr2kepub::{ConvertConfig, Converter};
/// use std::path::Path;
///
/// let output = Converter::new()
///     .with_config(ConvertConfig::default().with_compression_level(9))
///     .convert(Path::new("issue-01.cbr"))?;
/// println!("{}", output.display());
/// # Ok::<(), cbr2kepub::Error>(())
/// ```
pub struct Converter {
    config: ConvertConfig,
    ids: Box<dyn IdGenerator>,
    validator: Box<dyn ImageValidator>,
}

impl Converter {
    /// Create a converter with default configuration, random identifiers and
    /// header validation.
    pub fn new() -> Self {
        Self {
            config: ConvertConfig::default(),
            ids: Box::new(UuidGenerator),
            validator: Box::new(HeaderValidator),
        }
    }

    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the identifier source, e.g. with
    /// [`SequentialIds`](crate::SequentialIds) for reproducible output.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_validator(mut self, validator: impl ImageValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert `input`, returning the path of the written container.
    pub fn convert(&self, input: &Path) -> Result<PathBuf> {
        check_input(input)?;
        let output = self
            .config
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(input));

        let scratch = Scratch::create(self.config.scratch_parent.as_deref())?;
        let pages = self.extract_pages(input, &scratch)?;

        let images_dir = scratch.path().join("Images");
        let validator: Option<&dyn ImageValidator> =
            self.config.validate_images.then_some(&*self.validator);
        stage_pages(&pages, &scratch.extracted(), &images_dir, validator)?;

        let identity = BookIdentity::generate(book_title(input), &*self.ids);
        let package = KepubPackage::new(identity, pages).with_language(&self.config.language);
        write_kepub(
            &package,
            &images_dir,
            &output,
            self.config.compression_level,
        )?;

        scratch.close();
        Ok(output)
    }

    /// Extract and order the pages of `input` without writing any output.
    ///
    /// Original paths are relative to the archive root.
    pub fn plan(&self, input: &Path) -> Result<Vec<Page>> {
        check_input(input)?;
        let scratch = Scratch::create(self.config.scratch_parent.as_deref())?;
        let pages = self.extract_pages(input, &scratch)?;
        scratch.close();
        Ok(pages)
    }

    fn extract_pages(&self, input: &Path, scratch: &Scratch) -> Result<Vec<Page>> {
        let unrar = match &self.config.unrar_program {
            Some(program) => UnrarExtractor::with_program(program),
            None => UnrarExtractor::default(),
        };

        let extracted = scratch.extracted();
        extract_archive(input, &extracted, &unrar)?;

        let files = collect_pages(&extracted)?;
        info!(count = files.len(), "found page images");
        Ok(assign_pages(files))
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert `input` with default settings, writing to `output` or the
/// default `<input-stem>.kepub.epub` path.
pub fn convert(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let config = ConvertConfig {
        output: output.map(Path::to_path_buf),
        ..ConvertConfig::default()
    };
    Converter::new().with_config(config).convert(input)
}

/// `<input-stem>.kepub.epub` beside the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("kepub.epub")
}

/// Book title: the input file name without its extension.
pub fn book_title(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn check_input(input: &Path) -> Result<()> {
    if input.is_file() {
        Ok(())
    } else {
        Err(Error::InputNotFound(input.to_path_buf()))
    }
}

/// Private working directory for one run, removed when dropped.
///
/// Early returns drop it too, so every exit path cleans up.
struct Scratch {
    dir: TempDir,
}

impl Scratch {
    fn create(parent: Option<&Path>) -> Result<Self> {
        let parent = parent.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let dir = tempfile::Builder::new()
            .prefix("cbr2kepub_")
            .tempdir_in(&parent)
            .map_err(Error::write(parent))?;
        Ok(Self { dir })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn extracted(&self) -> PathBuf {
        self.path().join("extracted")
    }

    /// Remove the directory now, logging rather than failing on errors.
    fn close(self) {
        let path = self.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => info!("cleaned up temporary files"),
            Err(e) => warn!(path = %path.display(), "could not remove temporary files: {e}"),
        }
    }
}
