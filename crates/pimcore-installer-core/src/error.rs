use std::path::PathBuf;

use thiserror::Error;

/// Fatal installer failures. Everything else is reported as data by the caller.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("missing `{key}` in installer configuration")]
    MissingConfig { key: &'static str },

    #[error(
        "invalid `{key}` path '{}'; the directory must exist. Aborting Pimcore installation.",
        path.display()
    )]
    InvalidPath { key: &'static str, path: PathBuf },

    #[error("unable to download '{url}' to '{}'", archive.display())]
    Download { url: String, archive: PathBuf },

    #[error(
        "checksum mismatch for '{}': expected sha256 {expected}, got {actual}",
        archive.display()
    )]
    ChecksumMismatch {
        archive: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("unable to extract archive '{}'", archive.display())]
    Extraction { archive: PathBuf },
}

impl InstallError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingConfig { .. } | Self::InvalidPath { .. })
    }

    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            Self::Download { .. } | Self::ChecksumMismatch { .. } | Self::Extraction { .. }
        )
    }
}
