use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use walkdir::WalkDir;

use crate::fs_utils::{ensure_dir, is_not_writable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    /// Symlinks, sockets, devices. Never followed.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub relative: PathBuf,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOrder {
    ParentsFirst,
    ChildrenFirst,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    /// Files (relative to the source root) left untouched because the destination refused writes
    /// (permissions or a read-only mount).
    pub skipped: Vec<PathBuf>,
    /// Non-regular entries that were not copied.
    pub ignored: Vec<PathBuf>,
}

/// Lazily walks everything below `root` (the root itself is not yielded) in file-name order,
/// without following symlinks.
pub fn walk_tree(root: &Path, order: WalkOrder) -> impl Iterator<Item = Result<TreeEntry>> + '_ {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .contents_first(order == WalkOrder::ChildrenFirst)
        .into_iter()
        .map(move |entry| {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .with_context(|| format!("failed to relativize {}", entry.path().display()))?
                .to_path_buf();
            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            Ok(TreeEntry { relative, kind })
        })
}

/// Mirrors `from` into `to`, creating directories as needed and overwriting files.
///
/// Nothing in `to` is deleted. Files whose destination refuses writes are skipped and listed in
/// the report, so a later run against a writable tree fills them in.
pub fn copy_tree(from: &Path, to: &Path) -> Result<CopyReport> {
    if !from.is_dir() {
        return Err(anyhow!(
            "source directory does not exist: {}",
            from.display()
        ));
    }

    let mut report = CopyReport::default();
    let mut blocked: Vec<PathBuf> = Vec::new();

    if let Err(err) = ensure_dir(to) {
        if !is_not_writable(&err) {
            return Err(err).with_context(|| format!("failed to create {}", to.display()));
        }
        debug!(path = %to.display(), "destination root is not writable");
        blocked.push(to.to_path_buf());
    }

    for entry in walk_tree(from, WalkOrder::ParentsFirst) {
        let entry = entry?;
        let src = from.join(&entry.relative);
        let dst = to.join(&entry.relative);

        if blocked.iter().any(|prefix| dst.starts_with(prefix)) {
            if entry.kind == EntryKind::File {
                report.skipped.push(entry.relative);
            }
            continue;
        }

        match entry.kind {
            EntryKind::Directory => match ensure_dir(&dst) {
                Ok(()) => {}
                Err(err) if is_not_writable(&err) => {
                    debug!(path = %dst.display(), "skipping unwritable directory");
                    blocked.push(dst);
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to create {}", dst.display()));
                }
            },
            EntryKind::File => match copy_file(&src, &dst)? {
                FileCopy::Copied => report.copied += 1,
                FileCopy::NotWritable => {
                    debug!(path = %dst.display(), "skipping unwritable file");
                    report.skipped.push(entry.relative);
                }
            },
            EntryKind::Other => {
                debug!(path = %src.display(), "ignoring non-regular entry");
                report.ignored.push(entry.relative);
            }
        }
    }

    Ok(report)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileCopy {
    Copied,
    NotWritable,
}

/// Copies one regular file, keeping its permissions. Only a refusal to write `dst` is reported
/// as [`FileCopy::NotWritable`]; an unreadable `src` is an error.
pub(crate) fn copy_file(src: &Path, dst: &Path) -> Result<FileCopy> {
    let mut reader =
        fs::File::open(src).with_context(|| format!("failed to read {}", src.display()))?;
    let permissions = reader
        .metadata()
        .with_context(|| format!("failed to stat {}", src.display()))?
        .permissions();

    let mut writer = match fs::File::create(dst) {
        Ok(file) => file,
        Err(err) if is_not_writable(&err) => return Ok(FileCopy::NotWritable),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to create {}", dst.display()));
        }
    };
    io::copy(&mut reader, &mut writer)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    writer
        .set_permissions(permissions)
        .with_context(|| format!("failed to set permissions on {}", dst.display()))?;
    Ok(FileCopy::Copied)
}

/// Removes `path` and everything below it, children first. A missing path is not an error.
pub fn delete_tree(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err).with_context(|| format!("failed to stat {}", path.display())),
    };

    if !metadata.is_dir() {
        return remove_entry(path);
    }

    for entry in walk_tree(path, WalkOrder::ChildrenFirst) {
        let entry = entry?;
        let target = path.join(&entry.relative);
        match entry.kind {
            EntryKind::Directory => fs::remove_dir(&target)
                .with_context(|| format!("failed to remove directory {}", target.display()))?,
            EntryKind::File | EntryKind::Other => remove_entry(&target)?,
        }
    }

    fs::remove_dir(path)
        .with_context(|| format!("failed to remove directory {}", path.display()))
}

fn remove_entry(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Directory symlinks on Windows are removed as directories.
        #[cfg(windows)]
        Err(_) if fs::remove_dir(path).is_ok() => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
    }
}
