use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use pimcore_installer_core::{CacheEntry, InstallError};
use tracing::{debug, info};

use crate::checksum::verify_sha256_file;
use crate::fs_utils::remove_file_if_exists;
use crate::tree::delete_tree;

const USER_AGENT: &str = concat!("pimcore-installer/", env!("CARGO_PKG_VERSION"));
const SYMLINK_MODE_MASK: u32 = 0o170000;
const SYMLINK_MODE: u32 = 0o120000;

/// Writes the bytes found at `url` to `dest`. `dest` is a scratch path; the caller renames it.
pub trait ArchiveFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Expands the archive at `archive` into the existing directory `dest_dir`.
pub trait ArchiveExpander {
    fn expand(&self, archive: &Path, dest_dir: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        let mut response = client
            .get(url)
            .send()
            .with_context(|| format!("request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("server rejected request: {url}"))?;

        let mut file = fs::File::create(dest)
            .with_context(|| format!("failed to create {}", dest.display()))?;
        response
            .copy_to(&mut file)
            .with_context(|| format!("failed to write response body to {}", dest.display()))?;
        file.sync_all()
            .with_context(|| format!("failed to flush {}", dest.display()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExpander;

impl ArchiveExpander for ZipExpander {
    fn expand(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let file = fs::File::open(archive)
            .with_context(|| format!("failed to open {}", archive.display()))?;
        let mut zip = zip::ZipArchive::new(file)
            .with_context(|| format!("failed to read zip archive {}", archive.display()))?;

        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .with_context(|| format!("failed to read entry {index} of {}", archive.display()))?;
            let Some(relative) = entry.enclosed_name() else {
                return Err(anyhow!(
                    "archive entry escapes the extraction directory: {}",
                    entry.name()
                ));
            };
            let out_path = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)
                    .with_context(|| format!("failed to create {}", out_path.display()))?;
                continue;
            }

            let mode = entry.unix_mode();
            if mode.is_some_and(|mode| mode & SYMLINK_MODE_MASK == SYMLINK_MODE) {
                debug!(entry = entry.name(), "skipping symlink entry");
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let mut out_file = fs::File::create(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
            io::copy(&mut entry, &mut out_file)
                .with_context(|| format!("failed to extract {}", out_path.display()))?;

            #[cfg(unix)]
            if let Some(mode) = mode.map(|mode| mode & 0o777).filter(|mode| *mode != 0) {
                use std::os::unix::fs::PermissionsExt;

                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                    .with_context(|| format!("failed to set mode on {}", out_path.display()))?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Fetched,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache-hit",
            Self::Fetched => "fetched",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub source_root: PathBuf,
    pub archive: CacheStatus,
    pub extraction: CacheStatus,
}

/// Makes sure the archive for `entry` is downloaded and expanded. Each step is skipped when
/// its output already exists, and neither output appears on disk until it is complete.
pub fn acquire_archive<F, X>(
    entry: &CacheEntry,
    fetcher: &F,
    expander: &X,
    expected_sha256: Option<&str>,
) -> Result<Acquisition>
where
    F: ArchiveFetcher + ?Sized,
    X: ArchiveExpander + ?Sized,
{
    let cache_dir = entry.cache_dir();
    fs::create_dir_all(cache_dir)
        .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;

    let archive = if entry.archive_path().exists() {
        debug!(archive = %entry.archive_path().display(), "archive already downloaded");
        CacheStatus::Hit
    } else {
        download_archive(entry, fetcher, expected_sha256)?;
        CacheStatus::Fetched
    };

    let extraction = if entry.extracted_path().exists() {
        debug!(path = %entry.extracted_path().display(), "archive already extracted");
        CacheStatus::Hit
    } else {
        extract_archive(entry, expander)?;
        CacheStatus::Fetched
    };

    Ok(Acquisition {
        source_root: entry.extracted_path().to_path_buf(),
        archive,
        extraction,
    })
}

fn download_archive<F>(entry: &CacheEntry, fetcher: &F, expected_sha256: Option<&str>) -> Result<()>
where
    F: ArchiveFetcher + ?Sized,
{
    let part_path = entry.partial_archive_path();
    remove_file_if_exists(&part_path)
        .with_context(|| format!("failed to remove stale download: {}", part_path.display()))?;

    info!(url = entry.archive_url(), "downloading Pimcore {}", entry.version());
    if let Err(err) = fetcher.fetch(entry.archive_url(), &part_path) {
        let _ = remove_file_if_exists(&part_path);
        return Err(err.context(InstallError::Download {
            url: entry.archive_url().to_string(),
            archive: entry.archive_path().to_path_buf(),
        }));
    }

    if let Some(expected) = expected_sha256 {
        let mismatch = verify_sha256_file(&part_path, expected);
        match mismatch {
            Ok(None) => {}
            Ok(Some(actual)) => {
                let _ = remove_file_if_exists(&part_path);
                return Err(InstallError::ChecksumMismatch {
                    archive: entry.archive_path().to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                }
                .into());
            }
            Err(err) => {
                let _ = remove_file_if_exists(&part_path);
                return Err(err);
            }
        }
    }

    fs::rename(&part_path, entry.archive_path()).with_context(|| {
        format!(
            "failed to move downloaded archive into cache: {}",
            entry.archive_path().display()
        )
    })
}

fn extract_archive<X>(entry: &CacheEntry, expander: &X) -> Result<()>
where
    X: ArchiveExpander + ?Sized,
{
    let staging = entry.staging_extract_path(std::process::id());
    delete_tree(&staging)?;
    fs::create_dir_all(&staging)
        .with_context(|| format!("failed to create {}", staging.display()))?;

    info!(archive = %entry.archive_path().display(), "extracting Pimcore {}", entry.version());
    let result = expander
        .expand(entry.archive_path(), &staging)
        .and_then(|()| promote_extracted_dir(entry, &staging));
    let cleanup = delete_tree(&staging);

    result.map_err(|err| {
        err.context(InstallError::Extraction {
            archive: entry.archive_path().to_path_buf(),
        })
    })?;
    cleanup
}

fn promote_extracted_dir(entry: &CacheEntry, staging: &Path) -> Result<()> {
    let produced = staging.join(entry.extracted_dir_name());
    if !produced.is_dir() {
        return Err(anyhow!(
            "archive has no top-level '{}' folder",
            entry.extracted_dir_name()
        ));
    }

    fs::rename(&produced, entry.extracted_path()).with_context(|| {
        format!(
            "failed to move extracted tree into cache: {}",
            entry.extracted_path().display()
        )
    })
}
