use std::path::{Path, PathBuf};

pub const CORE_APP_DIR: &str = "pimcore";
pub const VENDOR_LINK_NAME: &str = "vendor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementAction {
    CopyFile,
    /// `refresh` erases the destination before copying; otherwise the copy is additive.
    CopyTree { refresh: bool },
    CreateSymlink,
}

/// One independent copy or link operation populating a single path under the install root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementStep {
    Index,
    HtAccess,
    CoreApp,
    Plugins,
    Website,
    VendorLink,
}

impl PlacementStep {
    pub const ALL: [PlacementStep; 6] = [
        Self::Index,
        Self::HtAccess,
        Self::CoreApp,
        Self::Plugins,
        Self::Website,
        Self::VendorLink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::HtAccess => "htaccess",
            Self::CoreApp => "core",
            Self::Plugins => "plugins",
            Self::Website => "website",
            Self::VendorLink => "vendor-link",
        }
    }

    pub fn action(self) -> PlacementAction {
        match self {
            Self::Index | Self::HtAccess => PlacementAction::CopyFile,
            Self::CoreApp => PlacementAction::CopyTree { refresh: true },
            Self::Plugins | Self::Website => PlacementAction::CopyTree { refresh: false },
            Self::VendorLink => PlacementAction::CreateSymlink,
        }
    }

    fn source_name(self) -> Option<&'static str> {
        match self {
            Self::Index => Some("index.php"),
            Self::HtAccess => Some(".htaccess"),
            Self::CoreApp => Some(CORE_APP_DIR),
            Self::Plugins => Some("plugins_example"),
            Self::Website => Some("website_example"),
            Self::VendorLink => None,
        }
    }

    pub fn target_name(self) -> &'static str {
        match self {
            Self::Index => "index.php",
            Self::HtAccess => ".htaccess",
            Self::CoreApp => CORE_APP_DIR,
            Self::Plugins => "plugins",
            Self::Website => "website",
            Self::VendorLink => VENDOR_LINK_NAME,
        }
    }

    /// Maps the step onto concrete `(from, to)` paths. For the vendor link `from` is the link
    /// target and `to` is where the link is created.
    pub fn paths(
        self,
        source_root: &Path,
        install_root: &Path,
        vendor_root: &Path,
    ) -> (PathBuf, PathBuf) {
        let from = match self.source_name() {
            Some(name) => source_root.join(name),
            None => vendor_root.to_path_buf(),
        };
        (from, install_root.join(self.target_name()))
    }
}
