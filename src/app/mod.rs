mod formats;
mod pipeline;
mod request;
mod segment;
mod tui;

#[cfg(test)]
mod test_support;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{Cli, Command, RunArgs};
use crate::error::ClipError;
use crate::paths::settings_file_path;
use crate::settings::Settings;

use self::formats::{FormatMap, fetch_formats};
use self::pipeline::{Toolchain, run_pipeline, with_sigint_ignored};
use self::request::{RunInput, RunRequest};
use self::segment::Segment;

pub fn run(cli: Cli) -> Result<()> {
    let settings_path = settings_file_path()?;
    let mut settings = Settings::load(&settings_path)?;

    match cli.command {
        Some(Command::Formats { url }) => run_formats(&settings, &url)?,
        Some(Command::Run(args)) => run_request(&settings_path, &mut settings, args)?,
        Some(Command::Tui) | None => tui::run_tui(&settings_path, &mut settings)?,
    }

    Ok(())
}

fn run_formats(settings: &Settings, url: &str) -> Result<()> {
    let toolchain = Toolchain::resolve(settings, default_work_dir(settings, None)?);
    let formats = fetch_formats(&toolchain, url).map_err(into_report)?;
    print_formats(&formats);
    Ok(())
}

fn print_formats(formats: &FormatMap) {
    let default = formats.default_label();
    println!("{:<3} {:<12} {:<10}", "", "RESOLUTION", "FORMAT");
    for (label, format_id) in formats.entries() {
        let marker = if default.as_deref() == Some(label.as_str()) {
            "*"
        } else {
            ""
        };
        println!("{marker:<3} {label:<12} {format_id:<10}");
    }
}

fn run_request(settings_path: &Path, settings: &mut Settings, args: RunArgs) -> Result<()> {
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let toolchain =
        Toolchain::resolve(settings, default_work_dir(settings, args.work_dir.clone())?);

    let final_path = with_sigint_ignored(|| {
        execute_run(&toolchain, &args, &output_dir, &mut |line: &str| {
            println!("==> {line}")
        })
    })?;

    remember_output_dir(settings_path, settings, &output_dir);
    println!("\nFinal video saved to:\n{}", final_path.display());
    Ok(())
}

/// Field checks come first so a bad invocation never reaches a tool.
fn execute_run(
    toolchain: &Toolchain,
    args: &RunArgs,
    output_dir: &Path,
    status: &mut dyn FnMut(&str),
) -> Result<PathBuf> {
    let segments = args
        .segments
        .iter()
        .map(|raw| Segment::parse_range(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(into_report)?;
    let output_dir = output_dir.display().to_string();

    let mut input = RunInput {
        url: &args.url,
        output_dir: &output_dir,
        base_name: &args.name,
        resolution: args.resolution.as_deref(),
        trim: !args.no_trim,
        crop: !args.no_crop,
        segments: &segments,
    };
    RunRequest::check_fields(&input).map_err(into_report)?;

    let formats = fetch_formats(toolchain, &args.url).map_err(into_report)?;
    let default_label = formats.default_label();
    if input.resolution.is_none() {
        input.resolution = default_label.as_deref();
    }
    let request = RunRequest::build(&input, Some(&formats)).map_err(into_report)?;
    tracing::info!(
        url = %request.url,
        resolution = %request.resolution,
        segments = request.segments.len(),
        crop = request.crop,
        "starting run"
    );

    run_pipeline(&request, toolchain, status).map_err(into_report)
}

/// Command-line override, then the configured directory, then the current one.
pub(super) fn default_work_dir(settings: &Settings, override_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.or_else(|| settings.work_dir.clone()) {
        return Ok(dir);
    }
    env::current_dir().context("unable to resolve current directory")
}

/// Failing to persist the directory never fails the run.
pub(super) fn remember_output_dir(settings_path: &Path, settings: &mut Settings, dir: &Path) {
    let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    if let Err(err) = settings.remember_output_dir(settings_path, &dir) {
        tracing::warn!(error = %err, "could not save output directory");
    }
}

fn into_report(err: ClipError) -> anyhow::Error {
    let title = err.title();
    anyhow::Error::new(err).context(title)
}
