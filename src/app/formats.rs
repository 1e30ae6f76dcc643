use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ClipError, ClipResult};

use super::pipeline::Toolchain;

const VIDEO_ONLY_MARKER: &str = "video only";

static FORMAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(\w+)\s+(\d+)x(\d+)").expect("format line pattern is valid")
});

/// Resolution label (`"{height}p"`) to downloader format id, for one fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormatMap {
    by_height: BTreeMap<u32, String>,
}

impl FormatMap {
    /// Later inserts for the same height replace earlier ones.
    pub(crate) fn insert(&mut self, height: u32, format_id: impl Into<String>) {
        self.by_height.insert(height, format_id.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_height.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_height.len()
    }

    /// Labels ascending by height.
    pub(crate) fn labels(&self) -> Vec<String> {
        self.by_height.keys().map(|height| height_label(*height)).collect()
    }

    pub(crate) fn default_label(&self) -> Option<String> {
        self.by_height.keys().next_back().map(|height| height_label(*height))
    }

    pub(crate) fn format_id(&self, label: &str) -> Option<&str> {
        let height = label_height(label)?;
        self.by_height.get(&height).map(String::as_str)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (String, &str)> {
        self.by_height
            .iter()
            .map(|(height, id)| (height_label(*height), id.as_str()))
    }
}

pub(crate) fn height_label(height: u32) -> String {
    format!("{height}p")
}

/// Height of a `{height}p` label such as `1080p`. Anything else is `None`.
pub(crate) fn label_height(label: &str) -> Option<u32> {
    let digits = label.trim().strip_suffix('p')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Scans a `yt-dlp -F` table for video-only rows.
pub(crate) fn parse_format_listing(raw: &str) -> FormatMap {
    let mut formats = FormatMap::default();
    for line in raw.lines() {
        if !line.contains(VIDEO_ONLY_MARKER) {
            continue;
        }
        let Some(captures) = FORMAT_LINE.captures(line) else {
            continue;
        };
        let Ok(height) = captures[4].parse::<u32>() else {
            continue;
        };
        formats.insert(height, &captures[1]);
    }
    formats
}

pub(crate) fn fetch_formats(toolchain: &Toolchain, url: &str) -> ClipResult<FormatMap> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ClipError::MissingInput("Please enter a video URL."));
    }

    let listing = toolchain.list_formats(url)?;
    let formats = parse_format_listing(&listing.stdout);
    if !formats.is_empty() {
        tracing::info!(count = formats.len(), "resolved video-only formats");
        return Ok(formats);
    }
    if !listing.success {
        return Err(ClipError::tool_failed(
            &toolchain.downloader_name(),
            &listing.status,
            &listing.stderr,
        ));
    }
    Err(ClipError::NoFormats)
}
