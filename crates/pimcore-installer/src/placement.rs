use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use pimcore_installer_core::{
    relative_path, relative_path_with_separator, IndexMode, PlacementAction, PlacementStep,
};
use tracing::{debug, info, warn};

use crate::fs_utils::{is_not_writable, path_exists_no_follow};
use crate::tree::{copy_file, copy_tree, delete_tree, CopyReport, FileCopy};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.php.tpl");
const VENDOR_ROUTE_PLACEHOLDER: &str = "{{vendor_route}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    SourceMissing,
    AlreadyExists,
    NotWritable,
    CopyFailed(String),
    LinkFailed(String),
}

impl SkipReason {
    pub fn describe(&self) -> String {
        match self {
            Self::SourceMissing => "source not present in distribution".to_string(),
            Self::AlreadyExists => "already exists".to_string(),
            Self::NotWritable => "destination not writable".to_string(),
            Self::CopyFailed(reason) => format!("copy failed: {reason}"),
            Self::LinkFailed(reason) => format!("symlink refused: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Placed,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: PlacementStep,
    pub outcome: StepOutcome,
    pub copy: Option<CopyReport>,
}

impl StepReport {
    fn placed(step: PlacementStep) -> Self {
        Self {
            step,
            outcome: StepOutcome::Placed,
            copy: None,
        }
    }

    fn skipped(step: PlacementStep, reason: SkipReason) -> Self {
        Self {
            step,
            outcome: StepOutcome::Skipped(reason),
            copy: None,
        }
    }
}

pub(crate) struct PlacementContext<'a> {
    pub source_root: &'a Path,
    pub install_root: &'a Path,
    pub vendor_root: &'a Path,
    pub index_mode: IndexMode,
}

pub(crate) fn run_step(step: PlacementStep, ctx: &PlacementContext<'_>) -> Result<StepReport> {
    let (from, to) = step.paths(ctx.source_root, ctx.install_root, ctx.vendor_root);

    let report = match (step, step.action()) {
        (PlacementStep::Index, _) if ctx.index_mode == IndexMode::Template => {
            match write_index_from_template(&to, ctx.vendor_root) {
                StepOutcome::Placed => StepReport::placed(step),
                StepOutcome::Skipped(reason) => StepReport::skipped(step, reason),
            }
        }
        (_, PlacementAction::CopyFile) => match copy_file_if_exists(&from, &to) {
            StepOutcome::Placed => StepReport::placed(step),
            StepOutcome::Skipped(reason) => StepReport::skipped(step, reason),
        },
        (_, PlacementAction::CopyTree { refresh }) => {
            if !from.is_dir() {
                return Err(anyhow!(
                    "distribution is missing '{}': {}",
                    step.as_str(),
                    from.display()
                ));
            }
            if refresh {
                delete_tree(&to)?;
            }
            let copy = copy_tree(&from, &to)?;
            if !copy.skipped.is_empty() {
                warn!(
                    step = step.as_str(),
                    skipped = copy.skipped.len(),
                    "some files could not be written"
                );
            }
            StepReport {
                step,
                outcome: StepOutcome::Placed,
                copy: Some(copy),
            }
        }
        (_, PlacementAction::CreateSymlink) => match link_dir(&from, &to) {
            StepOutcome::Placed => StepReport::placed(step),
            StepOutcome::Skipped(reason) => StepReport::skipped(step, reason),
        },
    };

    match &report.outcome {
        StepOutcome::Placed => info!(step = step.as_str(), path = %to.display(), "placed"),
        StepOutcome::Skipped(reason) => {
            debug!(step = step.as_str(), reason = %reason.describe(), "skipped")
        }
    }
    Ok(report)
}

/// Single-file steps never abort the install; any failure skips just this step.
fn copy_file_if_exists(from: &Path, to: &Path) -> StepOutcome {
    if !from.is_file() {
        return StepOutcome::Skipped(SkipReason::SourceMissing);
    }

    match copy_file(from, to) {
        Ok(FileCopy::Copied) => StepOutcome::Placed,
        Ok(FileCopy::NotWritable) => StepOutcome::Skipped(SkipReason::NotWritable),
        Err(err) => {
            warn!(path = %to.display(), "failed to copy file: {err:#}");
            StepOutcome::Skipped(SkipReason::CopyFailed(format!("{err:#}")))
        }
    }
}

/// Renders the bundled `index.php` with the route from `index_path`'s directory to
/// `vendor_root`.
pub fn render_index_template(index_path: &Path, vendor_root: &Path) -> String {
    // PHP source always uses forward slashes.
    let route = relative_path_with_separator(index_path, vendor_root, "/");
    INDEX_TEMPLATE.replace(VENDOR_ROUTE_PLACEHOLDER, &route)
}

fn write_index_from_template(index_path: &Path, vendor_root: &Path) -> StepOutcome {
    let contents = render_index_template(index_path, vendor_root);
    match fs::write(index_path, contents) {
        Ok(()) => StepOutcome::Placed,
        Err(err) if is_not_writable(&err) => StepOutcome::Skipped(SkipReason::NotWritable),
        Err(err) => {
            warn!(path = %index_path.display(), "failed to write index template: {err}");
            StepOutcome::Skipped(SkipReason::CopyFailed(err.to_string()))
        }
    }
}

/// Creates a relative directory symlink at `link` resolving to `target`, unless anything
/// already occupies `link`.
fn link_dir(target: &Path, link: &Path) -> StepOutcome {
    if path_exists_no_follow(link) {
        debug!(path = %link.display(), "link location already occupied");
        return StepOutcome::Skipped(SkipReason::AlreadyExists);
    }

    let relative = relative_path(link, target);
    match create_dir_symlink(&relative, link) {
        Ok(()) => StepOutcome::Placed,
        Err(err) => {
            warn!(
                link = %link.display(),
                target = %relative.display(),
                "failed to create symlink: {err}"
            );
            StepOutcome::Skipped(SkipReason::LinkFailed(err.to_string()))
        }
    }
}

#[cfg(unix)]
fn create_dir_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_dir_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
