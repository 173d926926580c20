use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use super::Extractor;
use crate::error::{Error, Result};

/// In-process extractor for ZIP-based comic archives (CBZ, and CBR files that
/// are really ZIPs).
#[derive(Debug, Clone, Copy, Default)]
pub struct CbzExtractor;

impl Extractor for CbzExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;
        fs::create_dir_all(dest).map_err(Error::write(dest))?;

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;

            // Reject absolute paths and `..` traversal
            let Some(relative) = entry.enclosed_name() else {
                warn!(entry = entry.name(), "skipping archive entry outside extraction root");
                continue;
            };
            let target = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(Error::write(&target))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(Error::write(parent))?;
            }

            let out = File::create(&target).map_err(Error::write(&target))?;
            let mut out = BufWriter::new(out);
            io::copy(&mut entry, &mut out)?;
            out.flush().map_err(Error::write(&target))?;
            debug!(entry = entry.name(), "extracted");
        }
        Ok(())
    }
}
