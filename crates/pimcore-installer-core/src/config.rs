use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Where the distributable subfolders are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Download and expand the release archive into the cache directory.
    #[default]
    Archive,
    /// Use the package Composer already placed under `<vendor-dir>/pimcore/pimcore`.
    VendorPackage,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::VendorPackage => "vendor-package",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "archive" => Some(Self::Archive),
            "vendor-package" | "vendor" => Some(Self::VendorPackage),
            _ => None,
        }
    }
}

/// How `index.php` is produced in the install root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexMode {
    #[default]
    Copy,
    Template,
}

impl IndexMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Template => "template",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "copy" => Some(Self::Copy),
            "template" => Some(Self::Template),
            _ => None,
        }
    }
}

/// One layer of installer settings. Unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InstallerConfig {
    pub pimcore_version: Option<String>,
    pub document_root_path: Option<PathBuf>,
    pub vendor_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub archive_url: Option<String>,
    pub archive_sha256: Option<String>,
    pub source: Option<SourceKind>,
    pub index: Option<IndexMode>,
}

/// The subset of Composer's `config` object the installer understands. Other keys, including
/// Composer's own `cache-dir`, belong to Composer and are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ComposerConfig {
    pimcore_version: Option<String>,
    document_root_path: Option<PathBuf>,
    vendor_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerManifest {
    #[serde(default)]
    config: ComposerConfig,
}

impl InstallerConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse installer config")?;
        Ok(config.normalized())
    }

    pub fn from_composer_json_str(input: &str) -> anyhow::Result<Self> {
        let manifest: ComposerManifest =
            serde_json::from_str(input).context("failed to parse composer.json")?;
        let config = Self {
            pimcore_version: manifest.config.pimcore_version,
            document_root_path: manifest.config.document_root_path,
            vendor_dir: manifest.config.vendor_dir,
            ..Self::default()
        };
        Ok(config.normalized())
    }

    /// Layers `overrides` on top of `self`; any field set in `overrides` wins.
    pub fn merge(self, overrides: InstallerConfig) -> InstallerConfig {
        InstallerConfig {
            pimcore_version: overrides.pimcore_version.or(self.pimcore_version),
            document_root_path: overrides.document_root_path.or(self.document_root_path),
            vendor_dir: overrides.vendor_dir.or(self.vendor_dir),
            cache_dir: overrides.cache_dir.or(self.cache_dir),
            archive_url: overrides.archive_url.or(self.archive_url),
            archive_sha256: overrides.archive_sha256.or(self.archive_sha256),
            source: overrides.source.or(self.source),
            index: overrides.index.or(self.index),
        }
        .normalized()
    }

    // Blank strings count as unset, the same way an empty Composer value does.
    fn normalized(mut self) -> Self {
        self.pimcore_version = non_blank(self.pimcore_version);
        self.archive_url = non_blank(self.archive_url);
        self.archive_sha256 = non_blank(self.archive_sha256).map(|v| v.to_ascii_lowercase());
        self.document_root_path = self
            .document_root_path
            .filter(|path| !path.as_os_str().is_empty());
        self.vendor_dir = self.vendor_dir.filter(|path| !path.as_os_str().is_empty());
        self.cache_dir = self.cache_dir.filter(|path| !path.as_os_str().is_empty());
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
