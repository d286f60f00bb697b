//! Archive extraction into the working directory
//!
//! Routes by archive format: gzip-compressed tarballs through `flate2` +
//! `tar`, zip archives through the `zip` crate with `enclosed_name` guarding
//! against entries that would escape the destination. Extraction is blocking
//! work and runs under `spawn_blocking`.

use crate::error::{Error, Result};
use crate::types::ArchiveFormat;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tokio::task::spawn_blocking;
use tracing::{debug, warn};

/// Unpacks staged archives into per-edition working directories
#[derive(Clone, Copy, Debug, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Create an extractor
    pub fn new() -> Self {
        Self
    }

    /// Unpack `archive` into `dest`, which must already exist.
    ///
    /// Corrupt or unexpected archive content aborts the update; partially
    /// extracted files are left for the staging cleanup.
    pub async fn extract(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        dest: &Path,
    ) -> Result<()> {
        let archive_owned = archive.to_path_buf();
        let dest_owned = dest.to_path_buf();

        let result = spawn_blocking(move || match format {
            ArchiveFormat::TarGz => extract_tar_gz(&archive_owned, &dest_owned),
            ArchiveFormat::Zip => extract_zip(&archive_owned, &dest_owned),
        })
        .await
        .map_err(|e| Error::Extract {
            archive: archive.to_path_buf(),
            reason: format!("extraction task panicked: {e}"),
        })?;

        debug!(archive = %archive.display(), dest = %dest.display(), "extracted archive");
        result
    }
}

fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| extract_error(archive_path, e))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    // tar::Archive::unpack already rejects entries escaping the destination
    archive
        .unpack(dest)
        .map_err(|e| extract_error(archive_path, e))
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| extract_error(archive_path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| extract_error(archive_path, e))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| extract_error(archive_path, e))?;

        let entry_path = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                warn!(archive = %archive_path.display(), "skipping zip entry with unsafe path");
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&entry_path).map_err(|e| extract_error(archive_path, e))?;
            continue;
        }

        if let Some(parent) = entry_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| extract_error(archive_path, e))?;
        }
        let mut out =
            File::create(&entry_path).map_err(|e| extract_error(archive_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| extract_error(archive_path, e))?;
    }

    Ok(())
}

fn extract_error(archive: &Path, err: impl std::fmt::Display) -> Error {
    Error::Extract {
        archive: archive.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Return type alias used by extraction helpers in tests
#[cfg(test)]
type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// Build a tar.gz containing `{name}_{version}/{name}.mmdb`, mirroring
    /// the vendor's tarball layout.
    fn build_tar_gz(path: &Path, name: &str, version: &str) -> TestResult {
        let file = File::create(path)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let member = format!("{name}_{version}/{name}.mmdb");
        let data = b"mmdb-payload";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, member, data.as_slice())?;
        builder.into_inner()?.finish()?;
        Ok(())
    }

    /// Build a zip containing a couple of CSV members under a subdirectory.
    fn build_zip(path: &Path, name: &str) -> TestResult {
        let file = File::create(path)?;
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();

        for member in ["Blocks-IPv4.csv", "Locations-en.csv"] {
            writer.start_file(format!("{name}/{member}"), options)?;
            writer.write_all(b"col_a,col_b\n1,2\n")?;
        }
        writer.finish()?;
        Ok(())
    }

    #[tokio::test]
    async fn extracts_tar_gz_preserving_member_paths() -> TestResult {
        let root = tempdir()?;
        let archive = root.path().join("GeoLite2-City_20240101.tar.gz");
        build_tar_gz(&archive, "GeoLite2-City", "20240101")?;
        let dest = root.path().join("work");
        std::fs::create_dir_all(&dest)?;

        ArchiveExtractor::new()
            .extract(&archive, ArchiveFormat::TarGz, &dest)
            .await?;

        let member = dest.join("GeoLite2-City_20240101/GeoLite2-City.mmdb");
        assert!(member.is_file(), "expected {member:?} to exist");
        assert_eq!(std::fs::read(member)?, b"mmdb-payload");
        Ok(())
    }

    #[tokio::test]
    async fn extracts_zip_members_into_dest() -> TestResult {
        let root = tempdir()?;
        let archive = root.path().join("GeoLite2-City-CSV_20240101.zip");
        build_zip(&archive, "GeoLite2-City-CSV_20240101")?;
        let dest = root.path().join("work");
        std::fs::create_dir_all(&dest)?;

        ArchiveExtractor::new()
            .extract(&archive, ArchiveFormat::Zip, &dest)
            .await?;

        let extracted: Vec<PathBuf> = walkdir::WalkDir::new(&dest)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        assert_eq!(extracted.len(), 2, "both CSV members should be extracted");
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_archive_is_an_extract_error() {
        let root = tempdir().unwrap();
        let archive = root.path().join("GeoLite2-City_20240101.tar.gz");
        std::fs::write(&archive, b"this is not gzip data").unwrap();
        let dest = root.path().join("work");
        std::fs::create_dir_all(&dest).unwrap();

        let err = ArchiveExtractor::new()
            .extract(&archive, ArchiveFormat::TarGz, &dest)
            .await
            .unwrap_err();

        match err {
            Error::Extract { archive: path, .. } => assert_eq!(path, archive),
            other => panic!("expected Extract error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zip_parsed_as_tar_gz_is_an_extract_error() -> TestResult {
        let root = tempdir()?;
        let archive = root.path().join("mislabelled.tar.gz");
        build_zip(&archive, "payload")?;
        let dest = root.path().join("work");
        std::fs::create_dir_all(&dest)?;

        let result = ArchiveExtractor::new()
            .extract(&archive, ArchiveFormat::TarGz, &dest)
            .await;

        assert!(
            matches!(result, Err(Error::Extract { .. })),
            "zip bytes must not extract as tar.gz: {result:?}"
        );
        Ok(())
    }
}
