use crate::error::ClipResult;

use super::super::formats::FormatMap;
use super::super::request::RunInput;
use super::super::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Url,
    OutputDir,
    BaseName,
    Start,
    End,
    Segments,
    Resolution,
    Trim,
    Crop,
}

impl Field {
    const ORDER: [Field; 9] = [
        Field::Url,
        Field::OutputDir,
        Field::BaseName,
        Field::Start,
        Field::End,
        Field::Segments,
        Field::Resolution,
        Field::Trim,
        Field::Crop,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    pub(crate) fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub(crate) fn previous(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Url => "Video URL",
            Self::OutputDir => "Output Directory",
            Self::BaseName => "Base File Name",
            Self::Start => "Start (HH:MM:SS)",
            Self::End => "End (HH:MM:SS)",
            Self::Segments => "Trim Segments",
            Self::Resolution => "Resolution",
            Self::Trim => "Trim",
            Self::Crop => "Crop",
        }
    }

    pub(crate) fn is_text(self) -> bool {
        matches!(
            self,
            Self::Url | Self::OutputDir | Self::BaseName | Self::Start | Self::End
        )
    }
}

/// Everything the form collects. A run request is cut from it on demand.
#[derive(Debug, Clone)]
pub(crate) struct FormState {
    pub(crate) url: String,
    pub(crate) output_dir: String,
    pub(crate) base_name: String,
    pub(crate) start: String,
    pub(crate) end: String,
    pub(crate) segments: Vec<Segment>,
    pub(crate) selected_segment: Option<usize>,
    pub(crate) formats: Option<FormatMap>,
    pub(crate) resolution: Option<String>,
    pub(crate) trim: bool,
    pub(crate) crop: bool,
    pub(crate) focus: Field,
}

impl FormState {
    pub(crate) fn new(output_dir: String) -> Self {
        Self {
            url: String::new(),
            output_dir,
            base_name: String::new(),
            start: String::new(),
            end: String::new(),
            segments: Vec::new(),
            selected_segment: None,
            formats: None,
            resolution: None,
            trim: true,
            crop: true,
            focus: Field::Url,
        }
    }

    pub(crate) fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Url => Some(&self.url),
            Field::OutputDir => Some(&self.output_dir),
            Field::BaseName => Some(&self.base_name),
            Field::Start => Some(&self.start),
            Field::End => Some(&self.end),
            _ => None,
        }
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Url => Some(&mut self.url),
            Field::OutputDir => Some(&mut self.output_dir),
            Field::BaseName => Some(&mut self.base_name),
            Field::Start => Some(&mut self.start),
            Field::End => Some(&mut self.end),
            _ => None,
        }
    }

    /// Returns false when no text field has focus.
    pub(crate) fn insert_text(&mut self, text: &str) -> bool {
        let Some(value) = self.focused_text_mut() else {
            return false;
        };
        let before = value.len();
        value.extend(text.chars().filter(|c| !c.is_control()));
        let changed = value.len() != before;
        if changed {
            self.url_edited();
        }
        true
    }

    pub(crate) fn delete_char(&mut self) -> bool {
        match self.focused_text_mut() {
            Some(value) => {
                if value.pop().is_some() {
                    self.url_edited();
                }
                true
            }
            None => false,
        }
    }

    /// Resolutions belong to the URL they were fetched for.
    fn url_edited(&mut self) {
        if self.focus == Field::Url {
            self.formats = None;
            self.resolution = None;
        }
    }

    /// Adds the typed start/end pair. Does nothing while either is blank.
    pub(crate) fn add_segment(&mut self) -> ClipResult<Option<&Segment>> {
        if self.start.trim().is_empty() || self.end.trim().is_empty() {
            return Ok(None);
        }
        let segment = Segment::new(&self.start, &self.end)?;
        self.segments.push(segment);
        self.start.clear();
        self.end.clear();
        self.selected_segment = Some(self.segments.len() - 1);
        Ok(self.segments.last())
    }

    pub(crate) fn remove_selected_segment(&mut self) -> Option<Segment> {
        let idx = self.selected_segment?;
        if idx >= self.segments.len() {
            self.selected_segment = None;
            return None;
        }
        let removed = self.segments.remove(idx);
        self.selected_segment = if self.segments.is_empty() {
            None
        } else {
            Some(idx.min(self.segments.len() - 1))
        };
        Some(removed)
    }

    pub(crate) fn move_segment_selection(&mut self, down: bool) {
        if self.segments.is_empty() {
            self.selected_segment = None;
            return;
        }
        let last = self.segments.len() - 1;
        self.selected_segment = Some(match (self.selected_segment, down) {
            (None, _) => 0,
            (Some(idx), true) => (idx + 1).min(last),
            (Some(idx), false) => idx.saturating_sub(1),
        });
    }

    /// Replaces the fetched formats and preselects the highest resolution.
    pub(crate) fn set_formats(&mut self, formats: FormatMap) {
        self.resolution = formats.default_label();
        self.formats = Some(formats);
    }

    pub(crate) fn cycle_resolution(&mut self, forward: bool) {
        let Some(formats) = self.formats.as_ref() else {
            return;
        };
        let labels = formats.labels();
        if labels.is_empty() {
            return;
        }
        let current = self
            .resolution
            .as_ref()
            .and_then(|label| labels.iter().position(|candidate| candidate == label));
        let next = match (current, forward) {
            (None, _) => labels.len() - 1,
            (Some(idx), true) => (idx + 1).min(labels.len() - 1),
            (Some(idx), false) => idx.saturating_sub(1),
        };
        self.resolution = Some(labels[next].clone());
    }

    /// Flips the focused toggle; returns false on other fields.
    pub(crate) fn toggle_focused(&mut self) -> bool {
        match self.focus {
            Field::Trim => self.trim = !self.trim,
            Field::Crop => self.crop = !self.crop,
            _ => return false,
        }
        true
    }

    pub(crate) fn run_input(&self) -> RunInput<'_> {
        RunInput {
            url: &self.url,
            output_dir: &self.output_dir,
            base_name: &self.base_name,
            resolution: self.resolution.as_deref(),
            trim: self.trim,
            crop: self.crop,
            segments: &self.segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::formats::parse_format_listing;
    use crate::app::test_support::SAMPLE_LISTING;
    use crate::error::ClipError;

    fn form() -> FormState {
        FormState::new("/tmp/clips".to_string())
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        assert_eq!(Field::Crop.next(), Field::Url);
        assert_eq!(Field::Url.previous(), Field::Crop);
        assert_eq!(Field::End.next(), Field::Segments);
    }

    #[test]
    fn text_goes_to_focused_field_only() {
        let mut form = form();
        assert!(form.insert_text("https://youtu.be/abc\n"));
        assert_eq!(form.url, "https://youtu.be/abc");

        form.focus = Field::Trim;
        assert!(!form.insert_text("x"));
        assert!(!form.delete_char());
        assert_eq!(form.url, "https://youtu.be/abc");
    }

    #[test]
    fn adding_segment_clears_inputs_and_selects_it() {
        let mut form = form();
        form.start = "00:00:10".to_string();
        form.end = "00:00:20".to_string();

        let added = form.add_segment().expect("valid segment").cloned();
        assert_eq!(added, Some(Segment::new("00:00:10", "00:00:20").expect("segment")));
        assert!(form.start.is_empty());
        assert!(form.end.is_empty());
        assert_eq!(form.selected_segment, Some(0));
    }

    #[test]
    fn blank_or_invalid_segment_is_not_added() {
        let mut form = form();
        form.start = "00:00:10".to_string();
        assert!(matches!(form.add_segment(), Ok(None)));

        form.end = "00:00:05".to_string();
        assert!(matches!(
            form.add_segment(),
            Err(ClipError::InvalidSegment { .. })
        ));
        assert!(form.segments.is_empty());
        assert_eq!(form.start, "00:00:10", "inputs kept for correction");
    }

    #[test]
    fn removing_last_segment_moves_selection_up() {
        let mut form = form();
        for (start, end) in [("0:10", "0:20"), ("1:00", "1:10")] {
            form.start = start.to_string();
            form.end = end.to_string();
            form.add_segment().expect("valid segment");
        }
        assert_eq!(form.selected_segment, Some(1));

        let removed = form.remove_selected_segment().expect("segment removed");
        assert_eq!(removed.start, "1:00");
        assert_eq!(form.selected_segment, Some(0));
        form.remove_selected_segment();
        assert_eq!(form.selected_segment, None);
        assert!(form.remove_selected_segment().is_none());
    }

    #[test]
    fn resolution_cycles_within_fetched_labels() {
        let mut form = form();
        form.cycle_resolution(true);
        assert_eq!(form.resolution, None, "nothing fetched yet");

        form.set_formats(parse_format_listing(SAMPLE_LISTING));
        assert_eq!(form.resolution.as_deref(), Some("1080p"));
        form.cycle_resolution(true);
        assert_eq!(form.resolution.as_deref(), Some("1080p"));
        form.cycle_resolution(false);
        form.cycle_resolution(false);
        form.cycle_resolution(false);
        assert_eq!(form.resolution.as_deref(), Some("144p"));
    }

    #[test]
    fn editing_url_drops_fetched_resolutions() {
        let mut form = form();
        form.insert_text("https://youtu.be/abc");
        form.set_formats(parse_format_listing(SAMPLE_LISTING));

        form.focus = Field::BaseName;
        form.insert_text("clip");
        assert!(form.formats.is_some(), "other fields keep the list");

        form.focus = Field::Url;
        form.insert_text("\n");
        assert!(form.formats.is_some(), "filtered input changes nothing");
        form.delete_char();
        assert!(form.formats.is_none());
        assert_eq!(form.resolution, None);

        let mut actions_form = FormState::new(String::new());
        actions_form.set_formats(parse_format_listing(SAMPLE_LISTING));
        actions_form.insert_text("x");
        assert!(actions_form.run_input().resolution.is_none());
    }

    #[test]
    fn run_input_reflects_toggles() {
        let mut form = form();
        form.focus = Field::Crop;
        assert!(form.toggle_focused());
        let input = form.run_input();
        assert!(input.trim);
        assert!(!input.crop);
        assert_eq!(input.output_dir, "/tmp/clips");
        assert_eq!(input.resolution, None);
    }
}
