use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("{0}")]
    MissingInput(&'static str),

    #[error("Please add at least one trim segment.")]
    MissingSegments,

    #[error("{0}")]
    MissingFormat(String),

    #[error("invalid segment `{input}`: {reason}")]
    InvalidSegment { input: String, reason: String },

    #[error("No video-only formats found.")]
    NoFormats,

    #[error("failed to launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {status}{detail}")]
    ToolFailed {
        tool: String,
        status: String,
        detail: String,
    },

    #[error("{0}")]
    MissingOutput(String),

    #[error("Could not detect resolution of {}.", .0.display())]
    ProbeUnavailable(PathBuf),

    #[error(
        "Output {} would clash with the temporary download; choose another base name or output directory.",
        .0.display()
    )]
    OutputClash(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ClipError {
    /// Heading used for blocking notifications.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "Missing Info",
            Self::MissingSegments => "Missing Segments",
            Self::MissingFormat(_) => "Missing Format",
            Self::InvalidSegment { .. } => "Invalid Segment",
            Self::NoFormats => "No Formats",
            Self::OutputClash(_) => "Missing Info",
            Self::ToolLaunch { .. } | Self::ToolFailed { .. } => "yt-dlp/ffmpeg Error",
            Self::MissingOutput(_) | Self::ProbeUnavailable(_) | Self::Io { .. } => "Error",
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Builds a tool failure, keeping the last lines of its stderr.
    pub(crate) fn tool_failed(tool: &str, status: impl ToString, stderr: &str) -> Self {
        let lines: Vec<&str> = stderr
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];
        let detail = if tail.is_empty() {
            String::new()
        } else {
            format!(":\n{}", tail.join("\n"))
        };
        Self::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
            detail,
        }
    }
}

const STDERR_TAIL_LINES: usize = 12;

pub type ClipResult<T> = std::result::Result<T, ClipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_keeps_only_stderr_tail() {
        let stderr = (1..=20)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let err = ClipError::tool_failed("ffmpeg", "exit status: 1", &stderr);
        let text = err.to_string();
        assert!(text.starts_with("ffmpeg exited with exit status: 1:\n"));
        assert!(!text.contains("line 8\n"));
        assert!(text.contains("line 9\n"));
        assert!(text.ends_with("line 20"));
    }

    #[test]
    fn tool_failure_without_stderr_has_no_detail() {
        let err = ClipError::tool_failed("yt-dlp", "exit status: 2", "\n  \n");
        assert_eq!(err.to_string(), "yt-dlp exited with exit status: 2");
    }

    #[test]
    fn titles_follow_error_kind() {
        assert_eq!(
            ClipError::MissingInput("Please enter a base name.").title(),
            "Missing Info"
        );
        assert_eq!(ClipError::MissingSegments.title(), "Missing Segments");
        assert_eq!(
            ClipError::MissingFormat("x".to_string()).title(),
            "Missing Format"
        );
    }
}
