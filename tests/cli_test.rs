//! Command-line behaviour of the `cbr2kepub` binary.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const JPEG_STUB: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x01, 0x00, 0x01, 0x03, 0x00, 0x00, 0xFF, 0xD9,
];

fn make_cbz(dir: &Path) -> PathBuf {
    let path = dir.join("issue.cbz");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    for name in ["001.jpg", "002.jpg"] {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(JPEG_STUB).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn cbr2kepub() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cbr2kepub"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_quiet_run_still_prints_output_path() {
    let dir = TempDir::new().unwrap();
    let input = make_cbz(dir.path());

    let output = cbr2kepub().arg("-q").arg(&input).output().unwrap();

    assert!(output.status.success());
    let expected = dir.path().join("issue.kepub.epub");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        expected.display().to_string()
    );
    assert!(output.stderr.is_empty());
    assert!(expected.exists());
}

#[test]
fn test_failure_exits_nonzero_with_one_line_error() {
    let dir = TempDir::new().unwrap();

    let output = cbr2kepub()
        .arg(dir.path().join("missing.cbr"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: input file not found"));
    assert_eq!(stderr.trim_end().lines().count(), 1);
}

#[test]
fn test_level_zero_is_accepted() {
    let dir = TempDir::new().unwrap();
    let input = make_cbz(dir.path());

    let output = cbr2kepub().args(["-q", "-l", "0"]).arg(&input).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}
