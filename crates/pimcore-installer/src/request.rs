use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pimcore_installer_core::{
    CacheEntry, IndexMode, InstallError, InstallerConfig, SourceKind,
    DEFAULT_ARCHIVE_URL_TEMPLATE, PACKAGE_NAME, VERSION_MARKER_RELATIVE_PATH,
};

const DEFAULT_DOCUMENT_ROOT: &str = "./www";
const DEFAULT_VENDOR_DIR: &str = "./vendor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Distributable folders come from the expanded release archive in `cache_dir`.
    Archive {
        cache_dir: PathBuf,
        url_template: String,
    },
    /// Distributable folders come from a package already installed under the vendor dir.
    VendorPackage { package_dir: PathBuf },
}

impl SourceStrategy {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Archive { .. } => SourceKind::Archive,
            Self::VendorPackage { .. } => SourceKind::VendorPackage,
        }
    }
}

/// A fully resolved install. Paths are canonical and known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    version: String,
    install_root: PathBuf,
    vendor_root: PathBuf,
    source: SourceStrategy,
    index_mode: IndexMode,
    archive_sha256: Option<String>,
}

impl InstallRequest {
    /// Resolves a merged config against `cwd`. Nothing on disk is touched.
    pub fn resolve(config: &InstallerConfig, cwd: &Path) -> Result<Self> {
        let version = config
            .pimcore_version
            .clone()
            .ok_or(InstallError::MissingConfig {
                key: "pimcore-version",
            })?;

        let install_root = canonical_dir(
            "document-root-path",
            &cwd.join(
                config
                    .document_root_path
                    .as_deref()
                    .unwrap_or(Path::new(DEFAULT_DOCUMENT_ROOT)),
            ),
        )?;
        let vendor_root = canonical_dir(
            "vendor-dir",
            &cwd.join(
                config
                    .vendor_dir
                    .as_deref()
                    .unwrap_or(Path::new(DEFAULT_VENDOR_DIR)),
            ),
        )?;

        let source = match config.source.unwrap_or_default() {
            SourceKind::Archive => {
                let cache_dir = match &config.cache_dir {
                    Some(dir) => cwd.join(dir),
                    None => default_cache_dir()?,
                };
                SourceStrategy::Archive {
                    cache_dir,
                    url_template: config
                        .archive_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_ARCHIVE_URL_TEMPLATE.to_string()),
                }
            }
            SourceKind::VendorPackage => SourceStrategy::VendorPackage {
                package_dir: canonical_dir(
                    "vendor-dir",
                    &vendor_root.join(PACKAGE_NAME).join(PACKAGE_NAME),
                )?,
            },
        };

        Ok(Self {
            version,
            install_root,
            vendor_root,
            source,
            index_mode: config.index.unwrap_or_default(),
            archive_sha256: config.archive_sha256.clone(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn vendor_root(&self) -> &Path {
        &self.vendor_root
    }

    pub fn source(&self) -> &SourceStrategy {
        &self.source
    }

    pub fn index_mode(&self) -> IndexMode {
        self.index_mode
    }

    pub fn archive_sha256(&self) -> Option<&str> {
        self.archive_sha256.as_deref()
    }

    pub fn version_marker_path(&self) -> PathBuf {
        self.install_root.join(VERSION_MARKER_RELATIVE_PATH)
    }

    /// The cache entry for this version, when the source is the release archive.
    pub fn cache_entry(&self) -> Option<CacheEntry> {
        match &self.source {
            SourceStrategy::Archive {
                cache_dir,
                url_template,
            } => Some(CacheEntry::new(cache_dir, &self.version, url_template)),
            SourceStrategy::VendorPackage { .. } => None,
        }
    }
}

pub fn default_cache_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows cache dir")?;
        return Ok(PathBuf::from(app_data)
            .join("PimcoreInstaller")
            .join("cache"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve cache dir")?;
    Ok(PathBuf::from(home)
        .join(".pimcore-installer")
        .join("cache"))
}

fn canonical_dir(key: &'static str, path: &Path) -> Result<PathBuf> {
    let invalid = || InstallError::InvalidPath {
        key,
        path: path.to_path_buf(),
    };
    let canonical = fs::canonicalize(path).map_err(|_| invalid())?;
    if !canonical.is_dir() {
        return Err(invalid().into());
    }
    Ok(canonical)
}
