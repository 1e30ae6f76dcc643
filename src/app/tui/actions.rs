use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::ClipError;

use super::form::{Field, FormState};

/// What the event loop should do after a key reached the form.
#[derive(Debug)]
pub(super) enum FormAction {
    None,
    Quit,
    FetchFormats,
    Run,
    Status(String),
    Notice(ClipError),
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

pub(super) fn handle_key(form: &mut FormState, key: KeyEvent) -> FormAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => FormAction::Quit,
            KeyCode::Char('f') => FormAction::FetchFormats,
            KeyCode::Char('r') => FormAction::Run,
            _ => FormAction::None,
        };
    }

    match key.code {
        KeyCode::Esc => return FormAction::Quit,
        KeyCode::Tab => {
            form.focus = form.focus.next();
            return FormAction::None;
        }
        KeyCode::BackTab => {
            form.focus = form.focus.previous();
            return FormAction::None;
        }
        _ => {}
    }

    match form.focus {
        field if field.is_text() => handle_text_key(form, key.code),
        Field::Segments => handle_segments_key(form, key.code),
        Field::Resolution => {
            match key.code {
                KeyCode::Left => form.cycle_resolution(false),
                KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => {
                    form.cycle_resolution(true)
                }
                KeyCode::Up => form.focus = form.focus.previous(),
                KeyCode::Down => form.focus = form.focus.next(),
                _ => {}
            }
            FormAction::None
        }
        _ => {
            match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    form.toggle_focused();
                }
                KeyCode::Up => form.focus = form.focus.previous(),
                KeyCode::Down => form.focus = form.focus.next(),
                _ => {}
            }
            FormAction::None
        }
    }
}

fn handle_text_key(form: &mut FormState, code: KeyCode) -> FormAction {
    match code {
        KeyCode::Char(c) => {
            form.insert_text(&c.to_string());
        }
        KeyCode::Backspace => {
            form.delete_char();
        }
        KeyCode::Enter if matches!(form.focus, Field::Start | Field::End) => {
            return match form.add_segment() {
                Ok(Some(segment)) => FormAction::Status(format!("Added segment {segment}.")),
                Ok(None) => FormAction::Status("Enter both a start and an end time.".to_string()),
                Err(err) => FormAction::Notice(err),
            };
        }
        KeyCode::Enter | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::Up => form.focus = form.focus.previous(),
        _ => {}
    }
    FormAction::None
}

fn handle_segments_key(form: &mut FormState, code: KeyCode) -> FormAction {
    match code {
        KeyCode::Up => form.move_segment_selection(false),
        KeyCode::Down => form.move_segment_selection(true),
        KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('d') => {
            if let Some(removed) = form.remove_selected_segment() {
                return FormAction::Status(format!("Removed segment {removed}."));
            }
        }
        _ => {}
    }
    FormAction::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(form: &mut FormState, code: KeyCode) -> FormAction {
        handle_key(form, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(form: &mut FormState, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    #[test]
    fn control_shortcuts_map_to_actions() {
        let mut form = FormState::new(String::new());
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        assert!(matches!(handle_key(&mut form, ctrl('f')), FormAction::FetchFormats));
        assert!(matches!(handle_key(&mut form, ctrl('r')), FormAction::Run));
        assert!(matches!(handle_key(&mut form, ctrl('q')), FormAction::Quit));
        assert!(matches!(press(&mut form, KeyCode::Esc), FormAction::Quit));
        assert!(form.url.is_empty(), "shortcuts do not type");
    }

    #[test]
    fn enter_on_end_field_adds_segment() {
        let mut form = FormState::new(String::new());
        form.focus = Field::Start;
        type_text(&mut form, "00:00:10");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "00:00:20");

        match press(&mut form, KeyCode::Enter) {
            FormAction::Status(message) => {
                assert_eq!(message, "Added segment 00:00:10 - 00:00:20.")
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert_eq!(form.segments.len(), 1);
    }

    #[test]
    fn invalid_segment_becomes_notice() {
        let mut form = FormState::new(String::new());
        form.focus = Field::End;
        form.start = "00:01:00".to_string();
        type_text(&mut form, "00:00:30");
        assert!(matches!(
            press(&mut form, KeyCode::Enter),
            FormAction::Notice(ClipError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn delete_removes_selected_segment() {
        let mut form = FormState::new(String::new());
        form.start = "0:10".to_string();
        form.end = "0:20".to_string();
        form.add_segment().expect("valid segment");
        form.focus = Field::Segments;

        assert!(matches!(
            press(&mut form, KeyCode::Char('d')),
            FormAction::Status(_)
        ));
        assert!(form.segments.is_empty());
        assert!(matches!(press(&mut form, KeyCode::Delete), FormAction::None));
    }

    #[test]
    fn space_toggles_checkboxes() {
        let mut form = FormState::new(String::new());
        form.focus = Field::Trim;
        press(&mut form, KeyCode::Char(' '));
        assert!(!form.trim);
        press(&mut form, KeyCode::Down);
        assert_eq!(form.focus, Field::Crop);
        press(&mut form, KeyCode::Enter);
        assert!(!form.crop);
    }
}
