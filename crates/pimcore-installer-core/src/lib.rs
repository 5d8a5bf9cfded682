mod archive;
mod config;
mod error;
mod paths;
mod placement;
mod version_marker;

pub use archive::{CacheEntry, DEFAULT_ARCHIVE_URL_TEMPLATE, PACKAGE_NAME};
pub use config::{IndexMode, InstallerConfig, SourceKind};
pub use error::InstallError;
pub use paths::{relative_path, relative_path_with_separator};
pub use placement::{PlacementAction, PlacementStep, CORE_APP_DIR, VENDOR_LINK_NAME};
pub use version_marker::{parse_version_marker, VERSION_MARKER_RELATIVE_PATH};
