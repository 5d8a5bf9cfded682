use std::path::{Path, PathBuf};

pub const PACKAGE_NAME: &str = "pimcore";
pub const DEFAULT_ARCHIVE_URL_TEMPLATE: &str =
    "https://github.com/pimcore/pimcore/archive/{version}.zip";

const VERSION_PLACEHOLDER: &str = "{version}";

/// Cache artifacts for one version. Existence of each path is the only completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    version: String,
    archive_path: PathBuf,
    archive_url: String,
    extracted_path: PathBuf,
}

impl CacheEntry {
    pub fn new(cache_dir: &Path, version: &str, url_template: &str) -> Self {
        Self {
            version: version.to_string(),
            archive_path: cache_dir.join(archive_file_name(version)),
            archive_url: render_archive_url(url_template, version),
            extracted_path: cache_dir.join(extracted_dir_name(version)),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn archive_url(&self) -> &str {
        &self.archive_url
    }

    pub fn extracted_path(&self) -> &Path {
        &self.extracted_path
    }

    pub fn cache_dir(&self) -> &Path {
        self.archive_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Name of the folder the archive is expected to expand to at its top level.
    pub fn extracted_dir_name(&self) -> String {
        extracted_dir_name(&self.version)
    }

    pub fn partial_archive_path(&self) -> PathBuf {
        self.cache_dir()
            .join(format!("{}.part", archive_file_name(&self.version)))
    }

    pub fn staging_extract_path(&self, pid: u32) -> PathBuf {
        self.cache_dir().join(format!(
            ".{}.extracting-{pid}",
            extracted_dir_name(&self.version)
        ))
    }
}

fn archive_file_name(version: &str) -> String {
    format!("{PACKAGE_NAME}-{version}.zip")
}

fn extracted_dir_name(version: &str) -> String {
    format!("{PACKAGE_NAME}-{version}")
}

fn render_archive_url(template: &str, version: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, version)
}
