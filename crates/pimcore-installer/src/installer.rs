use std::fs;
use std::io;

use anyhow::{anyhow, Context, Result};
use pimcore_installer_core::{parse_version_marker, PlacementStep};
use tracing::{debug, info};

use crate::acquire::{acquire_archive, Acquisition, ArchiveExpander, ArchiveFetcher};
use crate::acquire::{HttpFetcher, ZipExpander};
use crate::placement::{run_step, PlacementContext, StepReport};
use crate::request::{InstallRequest, SourceStrategy};
use crate::tree::delete_tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled,
    Installed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub version: String,
    pub outcome: InstallOutcome,
    pub acquisition: Option<Acquisition>,
    pub steps: Vec<StepReport>,
    pub cache_removed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStatus {
    pub requested: String,
    pub installed: Option<String>,
}

impl InstallStatus {
    pub fn is_current(&self) -> bool {
        self.installed.as_deref() == Some(self.requested.as_str())
    }
}

/// Runs the install pipeline. The fetcher and expander are the only I/O seams that reach
/// beyond the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct Installer<F = HttpFetcher, X = ZipExpander> {
    fetcher: F,
    expander: X,
}

impl Installer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F, X> Installer<F, X>
where
    F: ArchiveFetcher,
    X: ArchiveExpander,
{
    pub fn with_parts(fetcher: F, expander: X) -> Self {
        Self { fetcher, expander }
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Installs `request.version()` into the install root unless that exact version is
    /// already there.
    pub fn install(&self, request: &InstallRequest) -> Result<InstallReport> {
        let status = self.status(request)?;
        if status.is_current() {
            info!(version = request.version(), "Pimcore already installed");
            return Ok(InstallReport {
                version: request.version().to_string(),
                outcome: InstallOutcome::AlreadyInstalled,
                acquisition: None,
                steps: Vec::new(),
                cache_removed: false,
            });
        }
        if let Some(installed) = &status.installed {
            info!(
                installed = installed.as_str(),
                requested = request.version(),
                "replacing installed Pimcore"
            );
        }

        let acquisition = match request.source() {
            SourceStrategy::Archive { .. } => Some(self.download(request)?),
            SourceStrategy::VendorPackage { .. } => None,
        };
        let source_root = match (request.source(), &acquisition) {
            (_, Some(acquisition)) => acquisition.source_root.as_path(),
            (SourceStrategy::VendorPackage { package_dir }, None) => package_dir.as_path(),
            (SourceStrategy::Archive { .. }, None) => {
                return Err(anyhow!("archive source resolved without acquisition"));
            }
        };

        let ctx = PlacementContext {
            source_root,
            install_root: request.install_root(),
            vendor_root: request.vendor_root(),
            index_mode: request.index_mode(),
        };
        let mut steps = Vec::with_capacity(PlacementStep::ALL.len());
        for step in PlacementStep::ALL {
            let report = run_step(step, &ctx)
                .with_context(|| format!("placement step '{}' failed", step.as_str()))?;
            steps.push(report);
        }

        let cache_removed = match &acquisition {
            Some(acquisition) => {
                delete_tree(&acquisition.source_root)?;
                info!(path = %acquisition.source_root.display(), "removed extracted cache");
                true
            }
            None => false,
        };

        Ok(InstallReport {
            version: request.version().to_string(),
            outcome: InstallOutcome::Installed,
            acquisition,
            steps,
            cache_removed,
        })
    }

    /// Downloads and expands the release archive without touching the install root.
    pub fn download(&self, request: &InstallRequest) -> Result<Acquisition> {
        let entry = request.cache_entry().ok_or_else(|| {
            anyhow!("download requires the archive source; vendor-package installs have nothing to fetch")
        })?;
        acquire_archive(
            &entry,
            &self.fetcher,
            &self.expander,
            request.archive_sha256(),
        )
    }

    /// Reads the version marker under the install root.
    pub fn status(&self, request: &InstallRequest) -> Result<InstallStatus> {
        let marker = request.version_marker_path();
        let installed = match fs::read_to_string(&marker) {
            Ok(raw) => {
                let parsed = parse_version_marker(&raw);
                if parsed.is_none() {
                    debug!(path = %marker.display(), "version marker has no readable version");
                }
                parsed
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read version marker: {}", marker.display())
                });
            }
        };

        Ok(InstallStatus {
            requested: request.version().to_string(),
            installed,
        })
    }

    /// Removes the expanded archive for the requested version. Returns whether anything was
    /// there.
    pub fn clean_cache(&self, request: &InstallRequest) -> Result<bool> {
        let Some(entry) = request.cache_entry() else {
            return Ok(false);
        };
        let existed = entry.extracted_path().exists();
        delete_tree(entry.extracted_path())?;
        Ok(existed)
    }
}
