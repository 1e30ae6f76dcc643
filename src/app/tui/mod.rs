mod actions;
mod form;
mod render;
mod session;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::error::{ClipError, ClipResult};
use crate::settings::Settings;

use super::formats::fetch_formats;
use super::pipeline::{Toolchain, run_pipeline, with_sigint_ignored};
use super::request::RunRequest;
use super::{default_work_dir, remember_output_dir};

use self::actions::{FormAction, handle_key, status_error, status_info};
use self::form::FormState;
use self::render::draw_tui;
use self::session::TuiSession;

const ACTIVITY_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub(super) struct PendingNotice {
    pub(super) title: String,
    pub(super) message: String,
}

impl PendingNotice {
    fn from_error(err: &ClipError) -> Self {
        Self {
            title: err.title().to_string(),
            message: format!("{err}\n\nPress any key to continue."),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct ActivityLine {
    pub(super) at: DateTime<Local>,
    pub(super) text: String,
}

#[derive(Debug, Default)]
pub(super) struct Activity {
    pub(super) lines: Vec<ActivityLine>,
}

impl Activity {
    fn push(&mut self, text: impl Into<String>) {
        self.lines.push(ActivityLine {
            at: Local::now(),
            text: text.into(),
        });
        if self.lines.len() > ACTIVITY_LIMIT {
            let excess = self.lines.len() - ACTIVITY_LIMIT;
            self.lines.drain(..excess);
        }
    }
}

pub(crate) fn run_tui(settings_path: &Path, settings: &mut Settings) -> Result<()> {
    let toolchain = Toolchain::resolve(settings, default_work_dir(settings, None)?);
    let initial_dir = match settings.output_dir.as_ref() {
        Some(dir) => dir.display().to_string(),
        None => std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default(),
    };
    let mut form = FormState::new(initial_dir);
    let mut activity = Activity::default();
    let mut pending_notice = None::<PendingNotice>;
    let mut status = status_info("Enter a URL and press Ctrl+F to fetch resolutions.");

    let mut session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    loop {
        terminal.draw(|frame| {
            draw_tui(frame, &form, &status, &activity, pending_notice.as_ref())
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            Event::Paste(text) => {
                if pending_notice.is_none() {
                    form.insert_text(text.trim());
                }
                continue;
            }
            _ => continue,
        };

        if pending_notice.is_some() {
            pending_notice = None;
            continue;
        }

        match handle_key(&mut form, key) {
            FormAction::None => {}
            FormAction::Quit => break,
            FormAction::Status(message) => {
                activity.push(message.clone());
                status = status_info(&message);
            }
            FormAction::Notice(err) => {
                status = status_error(&err.to_string());
                pending_notice = Some(PendingNotice::from_error(&err));
            }
            FormAction::FetchFormats => {
                status = status_info("Fetching formats...");
                activity.push("Fetching formats...");
                terminal.draw(|frame| {
                    draw_tui(frame, &form, &status, &activity, pending_notice.as_ref())
                })?;

                match fetch_formats(&toolchain, &form.url) {
                    Ok(formats) => {
                        let labels = formats.labels().join(", ");
                        form.set_formats(formats);
                        activity.push(format!("Resolutions: {labels}"));
                        status = status_info("Resolution list updated.");
                    }
                    Err(err) => {
                        activity.push(format!("Could not fetch formats: {err}"));
                        status = status_error("Could not fetch formats.");
                        pending_notice = Some(PendingNotice::from_error(&err));
                    }
                }
            }
            FormAction::Run => {
                let request = match RunRequest::build(&form.run_input(), form.formats.as_ref()) {
                    Ok(request) => request,
                    Err(err) => {
                        status = status_error(&err.to_string());
                        pending_notice = Some(PendingNotice::from_error(&err));
                        continue;
                    }
                };

                activity.push("Preparing...");
                session.suspend()?;
                let result = run_suspended(&request, &toolchain, &mut activity);
                session.resume()?;
                terminal.clear()?;
                let result = result?;

                match result {
                    Ok(final_path) => {
                        remember_output_dir(settings_path, settings, &request.output_dir);
                        let message = format!("Final video saved to:\n{}", final_path.display());
                        activity.push(message.replace('\n', " "));
                        status = status_info(if request.trim {
                            "All segments saved and combined!"
                        } else {
                            "Video saved."
                        });
                        pending_notice = Some(PendingNotice {
                            title: "Success".to_string(),
                            message: format!("{message}\n\nPress any key to continue."),
                        });
                    }
                    Err(err) => {
                        activity.push(format!("Run failed: {err}"));
                        status = status_error("Run failed.");
                        pending_notice = Some(PendingNotice::from_error(&err));
                    }
                }
            }
        }
    }

    terminal.show_cursor()?;
    session.leave()?;
    Ok(())
}

/// Runs the pipeline on the plain terminal so tool progress stays visible,
/// then waits for Enter before the form comes back.
fn run_suspended(
    request: &RunRequest,
    toolchain: &Toolchain,
    activity: &mut Activity,
) -> Result<ClipResult<PathBuf>> {
    println!("clipcrop: {} -> {}", request.url, request.final_name());
    let result = with_sigint_ignored(|| {
        Ok(run_pipeline(request, toolchain, &mut |line: &str| {
            println!("\n==> {line}");
            activity.push(line);
        }))
    })?;

    match &result {
        Ok(path) => println!("\nDone: {}", path.display()),
        Err(err) => println!("\nFailed: {err}"),
    }
    print!("Press Enter to return to clipcrop...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
    Ok(result)
}
