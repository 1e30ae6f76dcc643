mod crop;
mod files;
mod process;
mod tools;


use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ClipError, ClipResult};

use super::request::RunRequest;

pub(crate) use self::crop::CropFilter;
pub(crate) use self::process::with_sigint_ignored;
pub(crate) use self::tools::Toolchain;

#[cfg(test)]
pub(crate) use self::crop::{parse_dimensions, vertical_width};
#[cfg(test)]
pub(crate) use self::files::{locate_download, manifest_contents, move_file};
#[cfg(test)]
pub(crate) use self::tools::resolve_tool;

/// Download, optionally crop, and join. Returns the final file path.
///
/// Segments run one after another since every download reuses the same
/// temporary name. The first failure aborts the run; segment outputs that
/// were already written stay where they are.
pub(crate) fn run_pipeline(
    request: &RunRequest,
    toolchain: &Toolchain,
    status: &mut dyn FnMut(&str),
) -> ClipResult<PathBuf> {
    let output_dir = prepare_output_dir(&request.output_dir)?;
    let final_output = output_dir.join(request.final_name());
    let segment_outputs =
        (1..=request.segments.len()).map(|n| output_dir.join(request.segment_name(n)));
    for output in std::iter::once(final_output.clone()).chain(segment_outputs) {
        if files::is_download_candidate(&toolchain.work_dir, &output) {
            return Err(ClipError::OutputClash(output));
        }
    }
    files::remove_stale_downloads(&toolchain.work_dir)?;

    if !request.trim {
        status("Downloading full video...");
        tracing::info!(url = %request.url, format = %request.format_id, "downloading full video");
        toolchain.download(&request.format_id, None, &request.url)?;
        let input = files::locate_download(&toolchain.work_dir)
            .ok_or_else(|| ClipError::MissingOutput("Download failed.".to_string()))?;
        if request.crop {
            status("Cropping video to 9:16...");
        }
        finish_clip(toolchain, &input, &final_output, request.crop)?;
        return Ok(final_output);
    }

    let total = request.segments.len();
    let mut outputs = Vec::with_capacity(total);
    for (idx, segment) in request.segments.iter().enumerate() {
        let n = idx + 1;
        status(&format!("Downloading segment {n} of {total}..."));
        tracing::info!(segment = n, range = %segment, "downloading segment");
        toolchain.download(
            &request.format_id,
            Some(&segment.download_section()),
            &request.url,
        )?;
        let input = files::locate_download(&toolchain.work_dir).ok_or_else(|| {
            ClipError::MissingOutput(format!("Segment {n} download failed."))
        })?;

        let output = output_dir.join(request.segment_name(n));
        if request.crop {
            status(&format!("Cropping segment {n} of {total} to 9:16..."));
        }
        finish_clip(toolchain, &input, &output, request.crop)?;
        outputs.push(output);
    }

    status(&format!("Combining {total} segment(s)..."));
    let manifest = files::write_manifest(&output_dir, &outputs)?;
    tracing::info!(manifest = %manifest.display(), output = %final_output.display(), "concatenating");
    toolchain.concat(&manifest, &final_output)?;
    Ok(final_output)
}

/// Crops `input` into `output`, or moves it there untouched, then drops the
/// temporary download.
fn finish_clip(toolchain: &Toolchain, input: &Path, output: &Path, crop: bool) -> ClipResult<()> {
    if crop {
        let (width, height) = toolchain
            .probe_dimensions(input)
            .ok_or_else(|| ClipError::ProbeUnavailable(input.to_path_buf()))?;
        let filter = CropFilter::for_source(width, height);
        if filter.is_fallback() {
            tracing::warn!(
                width,
                height,
                %filter,
                "source narrower than 9:16, scaling instead of cropping"
            );
        }
        toolchain.crop(input, &filter, output)?;
    } else {
        files::move_file(input, output)?;
    }
    if same_file_path(input, output) {
        return Ok(());
    }
    files::remove_if_exists(input)
}

fn same_file_path(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn prepare_output_dir(dir: &Path) -> ClipResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|err| {
        ClipError::io(
            format!("failed to create output directory {}", dir.display()),
            err,
        )
    })?;
    std::path::absolute(dir).map_err(|err| {
        ClipError::io(format!("failed to resolve {}", dir.display()), err)
    })
}
