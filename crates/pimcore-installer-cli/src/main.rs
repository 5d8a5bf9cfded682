mod completion;
mod dispatch;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use pimcore_installer_core::{IndexMode, InstallerConfig, SourceKind};
use tracing_subscriber::EnvFilter;

use crate::completion::CliCompletionShell;
use crate::dispatch::run_cli;

#[derive(Parser, Debug)]
#[command(name = "pimcore-installer")]
#[command(about = "Installs the Pimcore CMS into a Composer project's document root", long_about = None)]
struct Cli {
    /// Installer config file (default: ./pimcore-installer.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Disable badges, colors and spinners.
    #[arg(long, global = true)]
    plain: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download, extract and place Pimcore unless the requested version is already installed.
    Install {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Download and extract the release archive into the cache only.
    Download {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Show the installed and requested Pimcore versions.
    Status {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Remove the extracted archive for the requested version from the cache.
    CleanCache {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Option<CliCompletionShell>,
    },
}

/// Command-line layer of the installer settings.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
struct OverrideArgs {
    #[arg(long)]
    pimcore_version: Option<String>,
    #[arg(long = "document-root")]
    document_root: Option<PathBuf>,
    #[arg(long)]
    vendor_dir: Option<PathBuf>,
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Download URL template; `{version}` is replaced with the Pimcore version.
    #[arg(long)]
    archive_url: Option<String>,
    #[arg(long)]
    archive_sha256: Option<String>,
    #[arg(long, value_parser = parse_source_kind)]
    source: Option<SourceKind>,
    #[arg(long, value_parser = parse_index_mode)]
    index: Option<IndexMode>,
}

impl OverrideArgs {
    fn to_config(&self) -> InstallerConfig {
        InstallerConfig {
            pimcore_version: self.pimcore_version.clone(),
            document_root_path: self.document_root.clone(),
            vendor_dir: self.vendor_dir.clone(),
            cache_dir: self.cache_dir.clone(),
            archive_url: self.archive_url.clone(),
            archive_sha256: self.archive_sha256.clone(),
            source: self.source,
            index: self.index,
        }
    }
}

fn parse_source_kind(value: &str) -> Result<SourceKind, String> {
    SourceKind::parse(value)
        .ok_or_else(|| format!("unknown source '{value}' (expected archive or vendor-package)"))
}

fn parse_index_mode(value: &str) -> Result<IndexMode, String> {
    IndexMode::parse(value)
        .ok_or_else(|| format!("unknown index mode '{value}' (expected copy or template)"))
}

fn default_log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run_cli(cli)
}
