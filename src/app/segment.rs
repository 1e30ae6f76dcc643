use std::fmt;

use crate::error::{ClipError, ClipResult};

/// A `(start, end)` range handed to the downloader as `*START-END`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) start: String,
    pub(crate) end: String,
}

impl Segment {
    pub(crate) fn new(start: &str, end: &str) -> ClipResult<Self> {
        let start = start.trim();
        let end = end.trim();
        let invalid = |reason: &str| ClipError::InvalidSegment {
            input: format!("{start}-{end}"),
            reason: reason.to_string(),
        };

        if start.is_empty() || end.is_empty() {
            return Err(invalid("both start and end are required"));
        }
        let Some(start_secs) = parse_timestamp(start) else {
            return Err(invalid("start must look like HH:MM:SS"));
        };
        if !is_open_end(end) {
            let Some(end_secs) = parse_timestamp(end) else {
                return Err(invalid("end must look like HH:MM:SS or `inf`"));
            };
            if end_secs <= start_secs {
                return Err(invalid("end must be after start"));
            }
        }

        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// Parses the command-line form `START-END`.
    pub(crate) fn parse_range(raw: &str) -> ClipResult<Self> {
        let Some((start, end)) = raw.split_once('-') else {
            return Err(ClipError::InvalidSegment {
                input: raw.to_string(),
                reason: "expected START-END".to_string(),
            });
        };
        Self::new(start, end)
    }

    pub(crate) fn download_section(&self) -> String {
        format!("*{}-{}", self.start, self.end)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

fn is_open_end(value: &str) -> bool {
    value.eq_ignore_ascii_case("inf")
}

/// Seconds for `[[HH:]MM:]SS[.fff]`. Minutes and seconds after the first
/// component must stay below 60.
pub(crate) fn parse_timestamp(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut total = 0.0;
    let last = parts.len() - 1;
    for (idx, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return None;
        }
        let number = if idx == last {
            parse_seconds(part)?
        } else {
            if !part.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            part.parse::<u64>().ok()? as f64
        };
        if idx > 0 && number >= 60.0 {
            return None;
        }
        total = total * 60.0 + number;
    }
    Some(total)
}

fn parse_seconds(part: &str) -> Option<f64> {
    let (whole, fraction) = part.split_once('.').unwrap_or((part, ""));
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
