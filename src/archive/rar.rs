use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR_STR, Path};
use std::process::{Command, Stdio};

use tracing::debug;

use super::Extractor;
use crate::error::{Error, Result};

/// How to get `unrar` onto the machine, per platform.
pub const UNRAR_INSTALL_GUIDANCE: &str = "install it with `brew install unrar` on macOS, \
`sudo apt-get install unrar` (or equivalent) on Linux, \
or download it from https://www.rarlab.com/rar_add.htm on Windows";

/// Extracts RAR archives by running the external `unrar` program.
#[derive(Debug, Clone)]
pub struct UnrarExtractor {
    program: OsString,
}

impl UnrarExtractor {
    /// Use a specific `unrar` executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for UnrarExtractor {
    fn default() -> Self {
        Self::with_program("unrar")
    }
}

impl Extractor for UnrarExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest).map_err(Error::write(dest))?;

        // unrar treats the destination as a directory only with a trailing separator
        let mut dest_arg = dest.as_os_str().to_owned();
        dest_arg.push(MAIN_SEPARATOR_STR);

        debug!(program = ?self.program, "running unrar");
        let output = Command::new(&self.program)
            .arg("x")
            .arg("-o+")
            .arg("-idq")
            .arg(archive)
            .arg(&dest_arg)
            .stdin(Stdio::null())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::ExtractionToolMissing {
                    tool: self.program.to_string_lossy().into_owned(),
                    guidance: UNRAR_INSTALL_GUIDANCE,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction(format!(
                "unrar exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
