use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use pimcore_installer_core::InstallerConfig;
use tracing::debug;

pub(crate) const CONFIG_FILE_NAME: &str = "pimcore-installer.toml";
pub(crate) const COMPOSER_FILE_NAME: &str = "composer.json";

/// Builds the effective settings for `cwd`: composer.json, then the installer config file, then
/// `flags`. Later layers win field by field.
pub(crate) fn load_layered_config(
    cwd: &Path,
    config_path: Option<&Path>,
    flags: InstallerConfig,
) -> Result<InstallerConfig> {
    let composer = read_composer_layer(cwd)?;
    let file = read_file_layer(cwd, config_path)?;
    Ok(composer.merge(file).merge(flags))
}

fn read_composer_layer(cwd: &Path) -> Result<InstallerConfig> {
    let path = cwd.join(COMPOSER_FILE_NAME);
    let Some(raw) = read_optional(&path)? else {
        debug!(path = %path.display(), "no composer.json");
        return Ok(InstallerConfig::default());
    };
    InstallerConfig::from_composer_json_str(&raw)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn read_file_layer(cwd: &Path, config_path: Option<&Path>) -> Result<InstallerConfig> {
    let raw = match config_path {
        Some(explicit) => {
            let path = cwd.join(explicit);
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            Some((path, raw))
        }
        None => {
            let path = cwd.join(CONFIG_FILE_NAME);
            read_optional(&path)?.map(|raw| (path, raw))
        }
    };

    let Some((path, raw)) = raw else {
        return Ok(InstallerConfig::default());
    };
    debug!(path = %path.display(), "loading installer config");
    InstallerConfig::from_toml_str(&raw).with_context(|| format!("failed to load {}", path.display()))
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}
