//! Integration tests for detar-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn detar_cmd() -> Command {
    cargo_bin_cmd!("detar")
}

fn sample_tar() -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_mode(0o755);
    header.set_size(0);
    header.set_mtime(1_600_000_000);
    builder
        .append_data(&mut header, "pkg/", std::io::empty())
        .unwrap();

    let mut header = tar::Header::new_gnu();
    header.set_mode(0o640);
    header.set_size(5);
    header.set_mtime(1_600_000_000);
    builder
        .append_data(&mut header, "pkg/hello.txt", &b"hello"[..])
        .unwrap();

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_mode(0o777);
    header.set_size(0);
    builder
        .append_link(&mut header, "pkg/link", "hello.txt")
        .unwrap();

    builder.into_inner().unwrap()
}

fn write_archive(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn assert_sample_extracted(root: &Path) {
    let file = root.join("pkg/hello.txt");
    assert_eq!(fs::read_to_string(&file).unwrap(), "hello");
    assert_eq!(
        fs::metadata(&file).unwrap().permissions().mode() & 0o777,
        0o640
    );
    assert_eq!(
        fs::read_link(root.join("pkg/link")).unwrap(),
        Path::new("hello.txt")
    );
}

#[test]
fn test_version_flag() {
    detar_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("detar"));
}

#[test]
fn test_help_flag() {
    detar_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpack a tar archive"))
        .stdout(predicate::str::contains("--directory"));
}

#[test]
fn test_missing_archive_argument() {
    detar_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("ARCHIVE"));
}

#[test]
fn test_too_many_arguments() {
    detar_cmd()
        .arg("a.tar")
        .arg("b.tar")
        .assert()
        .failure();
}

#[test]
fn test_extract_plain_tar() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "sample.tar", &sample_tar());
    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();

    detar_cmd()
        .arg("-C")
        .arg(&out)
        .arg(&archive)
        .assert()
        .success();

    assert_sample_extracted(&out);
}

#[test]
fn test_extract_gzip_creates_destination() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "sample.tgz", &gzip(&sample_tar()));
    let out = temp.path().join("nested/out");

    detar_cmd()
        .arg("--directory")
        .arg(&out)
        .arg(&archive)
        .assert()
        .success();

    assert_sample_extracted(&out);
}

#[test]
fn test_extract_into_current_directory() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "sample.tar.gz", &gzip(&sample_tar()));
    let work = temp.path().join("work");
    fs::create_dir(&work).unwrap();

    detar_cmd()
        .current_dir(&work)
        .arg(&archive)
        .assert()
        .success();

    assert_sample_extracted(&work);
}

#[test]
fn test_empty_directory_means_current_directory() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "sample.tar", &sample_tar());
    let work = temp.path().join("work");
    fs::create_dir(&work).unwrap();

    detar_cmd()
        .current_dir(&work)
        .arg("-C")
        .arg("")
        .arg(&archive)
        .assert()
        .success();

    assert_sample_extracted(&work);
}

#[test]
fn test_extract_twice_succeeds() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "sample.tar", &sample_tar());
    let out = temp.path().join("out");

    for _ in 0..2 {
        detar_cmd()
            .arg("-C")
            .arg(&out)
            .arg(&archive)
            .assert()
            .success();
    }

    assert_sample_extracted(&out);
}

#[test]
fn test_nonexistent_archive() {
    let temp = TempDir::new().expect("failed to create temp dir");

    detar_cmd()
        .arg("-C")
        .arg(temp.path())
        .arg(temp.path().join("missing.tar"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to open archive"));
}

#[test]
fn test_nonexistent_archive_creates_no_destination() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let out = temp.path().join("out");

    detar_cmd()
        .arg("-C")
        .arg(&out)
        .arg(temp.path().join("missing.tgz"))
        .assert()
        .failure()
        .code(1);

    assert!(!out.exists());
}

#[test]
fn test_unsupported_entry_type() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::new(b'V'));
    header.set_mode(0o644);
    header.set_size(0);
    builder
        .append_data(&mut header, "volume", std::io::empty())
        .unwrap();
    let archive = write_archive(temp.path(), "odd.tar", &builder.into_inner().unwrap());
    let out = temp.path().join("out");

    detar_cmd()
        .arg("-C")
        .arg(&out)
        .arg(&archive)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsupported type flag 0x56"));

    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn test_verbose_logs_entries() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_archive(temp.path(), "sample.tar", &sample_tar());

    detar_cmd()
        .env_remove("RUST_LOG")
        .arg("-vv")
        .arg("-C")
        .arg(temp.path().join("out"))
        .arg(&archive)
        .assert()
        .success()
        .stderr(predicate::str::contains("hello.txt"));
}
