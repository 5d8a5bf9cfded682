use std::path::Path;

use anyhow::{Context, Result};
use pimcore_installer::{InstallRequest, Installer};
use tracing::info;

use crate::completion::{resolve_completion_shell, write_completions_script};
use crate::render::{
    current_output_style, format_acquisition, format_install_report, format_status, StatusLine,
    TerminalRenderer,
};
use crate::settings::load_layered_config;
use crate::{Cli, Commands, OverrideArgs};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let renderer = TerminalRenderer::from_style(current_output_style(cli.plain));
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Install { overrides } => {
            let request = resolve_request(config_path, &overrides)?;
            let installer = Installer::new();
            let spinner = renderer.start_spinner(&format!("install {}", request.version()));
            let report = match installer.install(&request) {
                Ok(report) => {
                    spinner.finish_success();
                    report
                }
                Err(err) => {
                    spinner.finish_abandon();
                    return Err(err);
                }
            };
            renderer.print_lines(&format_install_report(&report));
        }
        Commands::Download { overrides } => {
            let request = resolve_request(config_path, &overrides)?;
            let installer = Installer::new();
            let spinner = renderer.start_spinner(&format!("download {}", request.version()));
            let acquisition = match installer.download(&request) {
                Ok(acquisition) => {
                    spinner.finish_success();
                    acquisition
                }
                Err(err) => {
                    spinner.finish_abandon();
                    return Err(err);
                }
            };
            renderer.print_lines(&[format_acquisition(&acquisition)]);
        }
        Commands::Status { overrides } => {
            let request = resolve_request(config_path, &overrides)?;
            let status = Installer::new().status(&request)?;
            renderer.print_lines(&format_status(&status));
        }
        Commands::CleanCache { overrides } => {
            let request = resolve_request(config_path, &overrides)?;
            let removed = Installer::new().clean_cache(&request)?;
            let line = match (removed, request.cache_entry()) {
                (true, Some(entry)) => StatusLine {
                    status: "ok",
                    message: format!("removed {}", entry.extracted_path().display()),
                },
                _ => StatusLine {
                    status: "info",
                    message: "nothing to remove".to_string(),
                },
            };
            renderer.print_lines(&[line]);
        }
        Commands::Completions { shell } => {
            let shell_env = std::env::var("SHELL").ok();
            let shell = resolve_completion_shell(shell, shell_env.as_deref(), cfg!(windows));
            let mut stdout = std::io::stdout().lock();
            write_completions_script(shell, &mut stdout)?;
        }
    }

    Ok(())
}

fn resolve_request(config_path: Option<&Path>, overrides: &OverrideArgs) -> Result<InstallRequest> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    resolve_request_in(&cwd, config_path, overrides)
}

pub(crate) fn resolve_request_in(
    cwd: &Path,
    config_path: Option<&Path>,
    overrides: &OverrideArgs,
) -> Result<InstallRequest> {
    let config = load_layered_config(cwd, config_path, overrides.to_config())?;
    let request = InstallRequest::resolve(&config, cwd)?;
    info!(
        version = request.version(),
        install_root = %request.install_root().display(),
        vendor_root = %request.vendor_root().display(),
        source = request.source().kind().as_str(),
        index = request.index_mode().as_str(),
        "resolved install request"
    );
    Ok(request)
}
