use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ClipError, ClipResult};

/// Containers the downloader may pick for the fixed template, in lookup order.
pub(crate) const DOWNLOAD_EXTENSIONS: [&str; 3] = ["webm", "mp4", "mkv"];

pub(crate) const MANIFEST_NAME: &str = "concat_list.txt";

fn download_candidates(work_dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    DOWNLOAD_EXTENSIONS
        .iter()
        .map(move |ext| work_dir.join(format!("temp.{ext}")))
}

/// Removes leftovers of the fixed template from an earlier run.
pub(crate) fn remove_stale_downloads(work_dir: &Path) -> ClipResult<()> {
    for candidate in download_candidates(work_dir) {
        remove_if_exists(&candidate)?;
    }
    Ok(())
}

/// True when `path` is one of the names the download template can produce.
pub(crate) fn is_download_candidate(work_dir: &Path, path: &Path) -> bool {
    let Ok(path) = std::path::absolute(path) else {
        return false;
    };
    let work_dir = std::path::absolute(work_dir).unwrap_or_else(|_| work_dir.to_path_buf());
    download_candidates(&work_dir).any(|candidate| candidate == path)
}

pub(crate) fn locate_download(work_dir: &Path) -> Option<PathBuf> {
    download_candidates(work_dir).find(|candidate| candidate.is_file())
}

pub(crate) fn remove_if_exists(path: &Path) -> ClipResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ClipError::io(
            format!("failed to remove {}", path.display()),
            err,
        )),
    }
}

/// Rename, or copy and delete when the rename crosses filesystems.
pub(crate) fn move_file(from: &Path, to: &Path) -> ClipResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|err| {
        ClipError::io(
            format!("failed to move {} to {}", from.display(), to.display()),
            err,
        )
    })?;
    remove_if_exists(from)
}

/// One `file '<path>'` line per entry, quoted for the concat demuxer.
pub(crate) fn manifest_contents(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for path in paths {
        let escaped = path.to_string_lossy().replace('\'', r"'\''");
        out.push_str(&format!("file '{escaped}'\n"));
    }
    out
}

pub(crate) fn write_manifest(output_dir: &Path, paths: &[PathBuf]) -> ClipResult<PathBuf> {
    let manifest = output_dir.join(MANIFEST_NAME);
    fs::write(&manifest, manifest_contents(paths)).map_err(|err| {
        ClipError::io(format!("failed to write {}", manifest.display()), err)
    })?;
    Ok(manifest)
}
