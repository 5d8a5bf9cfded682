use std::io::IsTerminal;
use std::time::{Duration, Instant};

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};
use pimcore_installer::{
    Acquisition, InstallOutcome, InstallReport, InstallStatus, StepOutcome, StepReport,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn resolve_output_style(force_plain: bool, is_terminal: bool, no_color: bool) -> OutputStyle {
    if force_plain || !is_terminal || no_color {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

pub(crate) fn current_output_style(force_plain: bool) -> OutputStyle {
    resolve_output_style(
        force_plain,
        std::io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
    )
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

pub(crate) struct TerminalSpinner {
    label: String,
    progress_bar: Option<ProgressBar>,
    started_at: Instant,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn print_lines(self, lines: &[StatusLine]) {
        for line in lines {
            println!("{}", paint_status_line(self.style, line.status, &line.message));
        }
    }

    pub(crate) fn start_spinner(self, label: &str) -> TerminalSpinner {
        let progress_bar = if self.style == OutputStyle::Rich {
            let progress_bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg} {elapsed}") {
                progress_bar.set_style(style.tick_chars(".oO@* "));
            }
            progress_bar.set_message(label.to_string());
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            Some(progress_bar)
        } else {
            None
        };

        TerminalSpinner {
            label: label.to_string(),
            progress_bar,
            started_at: Instant::now(),
        }
    }
}

impl TerminalSpinner {
    pub(crate) fn finish_success(mut self) {
        let Some(progress_bar) = self.progress_bar.take() else {
            return;
        };
        progress_bar.finish_and_clear();
        println!(
            "{} {} complete in {}",
            colorize(label_style(), &self.label),
            colorize(badge_style("ok"), "done"),
            format_elapsed(self.started_at.elapsed())
        );
    }

    pub(crate) fn finish_abandon(mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
    }
}

/// One user-facing line with its severity (`ok`, `skip`, `warn`, `info`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct StatusLine {
    pub status: &'static str,
    pub message: String,
}

impl StatusLine {
    fn new(status: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub(crate) fn format_install_report(report: &InstallReport) -> Vec<StatusLine> {
    if report.outcome == InstallOutcome::AlreadyInstalled {
        return vec![StatusLine::new(
            "ok",
            format!("Pimcore {} already installed", report.version),
        )];
    }

    let mut lines = Vec::new();
    if let Some(acquisition) = &report.acquisition {
        lines.push(format_acquisition(acquisition));
    }
    lines.extend(report.steps.iter().map(format_step));
    if report.cache_removed {
        lines.push(StatusLine::new("info", "removed extracted archive from cache"));
    }
    lines.push(StatusLine::new(
        "ok",
        format!("installed Pimcore {}", report.version),
    ));
    lines
}

pub(crate) fn format_acquisition(acquisition: &Acquisition) -> StatusLine {
    StatusLine::new(
        "info",
        format!(
            "source {} (archive={} extraction={})",
            acquisition.source_root.display(),
            acquisition.archive.as_str(),
            acquisition.extraction.as_str()
        ),
    )
}

fn format_step(report: &StepReport) -> StatusLine {
    let name = report.step.as_str();
    match (&report.outcome, &report.copy) {
        (StepOutcome::Skipped(reason), _) => {
            StatusLine::new("skip", format!("{name}: skipped ({})", reason.describe()))
        }
        (StepOutcome::Placed, Some(copy)) if !copy.skipped.is_empty() => StatusLine::new(
            "warn",
            format!(
                "{name}: copied {} files, {} not writable",
                copy.copied,
                copy.skipped.len()
            ),
        ),
        (StepOutcome::Placed, Some(copy)) => {
            StatusLine::new("ok", format!("{name}: copied {} files", copy.copied))
        }
        (StepOutcome::Placed, None) => StatusLine::new("ok", format!("{name}: placed")),
    }
}

pub(crate) fn format_status(status: &InstallStatus) -> Vec<StatusLine> {
    let installed = status.installed.as_deref().unwrap_or("none");
    let verdict = if status.is_current() {
        StatusLine::new("ok", "up to date")
    } else {
        StatusLine::new("warn", "install required")
    };
    vec![
        StatusLine::new("info", format!("installed: {installed}")),
        StatusLine::new("info", format!("requested: {}", status.requested)),
        verdict,
    ]
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "skip" => "[SKIP]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn paint_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => render_status_line(style, status, message),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(badge_style(status), status_badge(status))
        ),
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    format!("{secs}.{millis:03}s")
}

fn badge_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "err" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn label_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightCyan.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
