mod acquire;
mod checksum;
mod fs_utils;
mod installer;
mod placement;
mod request;
mod tree;

pub use acquire::{
    acquire_archive, Acquisition, ArchiveExpander, ArchiveFetcher, CacheStatus, HttpFetcher,
    ZipExpander,
};
pub use checksum::{sha256_file_hex, verify_sha256_file};
pub use installer::{InstallOutcome, InstallReport, InstallStatus, Installer};
pub use placement::{render_index_template, SkipReason, StepOutcome, StepReport};
pub use request::{default_cache_dir, InstallRequest, SourceStrategy};
pub use tree::{copy_tree, delete_tree, walk_tree, CopyReport, EntryKind, TreeEntry, WalkOrder};

pub use pimcore_installer_core::{
    IndexMode, InstallError, InstallerConfig, PlacementStep, SourceKind,
};
