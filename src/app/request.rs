use std::path::PathBuf;

use crate::error::{ClipError, ClipResult};

use super::formats::{FormatMap, label_height};
use super::segment::Segment;

/// Raw values as collected from the form or command line.
#[derive(Debug, Clone)]
pub(crate) struct RunInput<'a> {
    pub(crate) url: &'a str,
    pub(crate) output_dir: &'a str,
    pub(crate) base_name: &'a str,
    pub(crate) resolution: Option<&'a str>,
    pub(crate) trim: bool,
    pub(crate) crop: bool,
    pub(crate) segments: &'a [Segment],
}

/// Validated, self-contained description of one processing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunRequest {
    pub(crate) url: String,
    pub(crate) output_dir: PathBuf,
    pub(crate) base_name: String,
    pub(crate) resolution: String,
    pub(crate) format_id: String,
    pub(crate) trim: bool,
    pub(crate) crop: bool,
    pub(crate) segments: Vec<Segment>,
}

impl RunRequest {
    /// Checks the typed fields and segments, in the order the form reports
    /// them. Runs before any tool is started.
    pub(crate) fn check_fields(input: &RunInput<'_>) -> ClipResult<()> {
        if input.url.trim().is_empty() {
            return Err(ClipError::MissingInput("Please enter a video URL."));
        }
        if input.output_dir.trim().is_empty() {
            return Err(ClipError::MissingInput("Please enter an output directory."));
        }
        if input.base_name.trim().is_empty() {
            return Err(ClipError::MissingInput("Please enter a base name."));
        }
        if input.trim && input.segments.is_empty() {
            return Err(ClipError::MissingSegments);
        }
        Ok(())
    }

    pub(crate) fn build(input: &RunInput<'_>, formats: Option<&FormatMap>) -> ClipResult<Self> {
        Self::check_fields(input)?;
        let url = input.url.trim();
        let output_dir = input.output_dir.trim();
        let base_name = input.base_name.trim();

        let fetch_first = || {
            ClipError::MissingFormat("Please fetch available resolutions first.".to_string())
        };
        let formats = formats.ok_or_else(fetch_first)?;
        let resolution = input
            .resolution
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .ok_or_else(fetch_first)?;
        if label_height(resolution).is_none() {
            return Err(ClipError::MissingFormat(format!(
                "Resolution `{resolution}` is not a label such as 1080p; choose one of: {}.",
                formats.labels().join(", ")
            )));
        }
        let format_id = formats.format_id(resolution).ok_or_else(|| {
            ClipError::MissingFormat(format!(
                "Resolution `{resolution}` is not available; choose one of: {}.",
                formats.labels().join(", ")
            ))
        })?;

        Ok(Self {
            url: url.to_string(),
            output_dir: PathBuf::from(output_dir),
            base_name: base_name.to_string(),
            resolution: resolution.to_string(),
            format_id: format_id.to_string(),
            trim: input.trim,
            crop: input.crop,
            segments: if input.trim {
                input.segments.to_vec()
            } else {
                Vec::new()
            },
        })
    }

    pub(crate) fn final_name(&self) -> String {
        format!("{}.mp4", self.base_name)
    }

    /// `n` counts from 1.
    pub(crate) fn segment_name(&self, n: usize) -> String {
        format!("{}_{n}.mp4", self.base_name)
    }
}
