use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, TableState, Wrap,
};

use super::form::{Field, FormState};
use super::{Activity, PendingNotice};

const ACCENT: Color = Color::Rgb(110, 170, 255);
const MUTED: Color = Color::Rgb(185, 195, 210);
const TEXT: Color = Color::Rgb(230, 235, 242);
const LABEL_WIDTH: usize = 18;

pub(super) fn draw_tui(
    frame: &mut Frame,
    form: &FormState,
    status: &str,
    activity: &Activity,
    pending_notice: Option<&PendingNotice>,
) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(header(form), chunks[0]);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(chunks[1]);
    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body_chunks[1]);

    let form_panel = Paragraph::new(form_lines(form)).block(panel_block("Request", false));
    frame.render_widget(form_panel, body_chunks[0]);

    draw_segments(frame, form, side_chunks[0]);
    draw_formats(frame, form, side_chunks[1]);

    let visible = chunks[2].height.saturating_sub(2) as usize;
    let skip = activity.lines.len().saturating_sub(visible);
    let activity_lines: Vec<Line> = activity
        .lines
        .iter()
        .skip(skip)
        .map(|line| {
            Line::from(vec![
                Span::styled(
                    line.at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(MUTED),
                ),
                Span::styled(line.text.clone(), Style::default().fg(TEXT)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(activity_lines).block(panel_block("Activity", false)),
        chunks[2],
    );

    let controls = Paragraph::new(Line::from(Span::styled(
        "Tab/Shift-Tab move  Enter add segment  Space toggle  ←/→ resolution  d delete  Ctrl+F fetch  Ctrl+R run  Esc quit",
        Style::default().fg(MUTED),
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls", false));
    frame.render_widget(controls, chunks[3]);

    let status_widget = Paragraph::new(status.to_string())
        .style(status_style(status))
        .block(panel_block("Status", false));
    frame.render_widget(status_widget, chunks[4]);

    if let Some(notice) = pending_notice {
        let popup_area = popup_rect_for_text(frame.area(), &notice.message);
        render_popup_shadow(frame, popup_area);
        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(notice.message.clone())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(modal_block(&notice.title));
        frame.render_widget(popup, popup_area);
    }
}

fn header(form: &FormState) -> Paragraph<'static> {
    let resolution = form.resolution.clone().unwrap_or_else(|| "-".to_string());
    let mode = match (form.trim, form.crop) {
        (true, true) => "TRIM + CROP",
        (true, false) => "TRIM",
        (false, true) => "CROP",
        (false, false) => "FULL VIDEO",
    };
    Paragraph::new(Line::from(vec![
        Span::styled(
            "CLIPCROP",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} segments", form.segments.len()),
            Style::default().fg(MUTED),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(format!("resolution {resolution}"), Style::default().fg(MUTED)),
        Span::styled("   ", Style::default()),
        Span::styled(mode, Style::default().fg(Color::Yellow)),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Dashboard", false))
}

fn form_lines(form: &FormState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for field in [
        Field::Url,
        Field::OutputDir,
        Field::BaseName,
        Field::Start,
        Field::End,
    ] {
        let focused = form.focus == field;
        let mut value = form.text(field).unwrap_or_default().to_string();
        if focused {
            value.push('▏');
        }
        lines.push(labeled_line(field, focused, value));
        if field == Field::BaseName {
            lines.push(Line::default());
        }
    }
    lines.push(Line::default());

    let resolution = match (form.formats.as_ref(), form.resolution.as_ref()) {
        (None, _) => "press Ctrl+F to fetch".to_string(),
        (Some(_), Some(label)) => format!("◂ {label} ▸"),
        (Some(_), None) => "-".to_string(),
    };
    lines.push(labeled_line(
        Field::Resolution,
        form.focus == Field::Resolution,
        resolution,
    ));
    lines.push(labeled_line(
        Field::Trim,
        form.focus == Field::Trim,
        format!("{} Trim video (multiple segments)", checkbox(form.trim)),
    ));
    lines.push(labeled_line(
        Field::Crop,
        form.focus == Field::Crop,
        format!("{} Crop to 9:16 vertical", checkbox(form.crop)),
    ));
    lines
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn labeled_line(field: Field, focused: bool, value: String) -> Line<'static> {
    let (marker, label_style, value_style) = if focused {
        (
            "▸ ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )
    } else {
        ("  ", Style::default().fg(MUTED), Style::default().fg(TEXT))
    };
    Line::from(vec![
        Span::styled(marker, label_style),
        Span::styled(
            format!("{:<width$}", field.label(), width = LABEL_WIDTH),
            label_style,
        ),
        Span::styled(value, value_style),
    ])
}

fn draw_segments(frame: &mut Frame, form: &FormState, area: Rect) {
    let rows: Vec<Row> = form
        .segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| {
            Row::new(vec![
                Cell::from((idx + 1).to_string()),
                Cell::from(segment.start.clone()),
                Cell::from(segment.end.clone()),
            ])
        })
        .collect();
    let focused = form.focus == Field::Segments;
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(45),
            Constraint::Percentage(45),
        ],
    )
    .header(
        Row::new(vec!["#", "Start", "End"])
            .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    )
    .block(panel_block("Trim Segments", focused))
    .row_highlight_style(if focused {
        Style::default()
            .bg(ACCENT)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    })
    .highlight_symbol("▸ ");

    let mut state = TableState::default();
    state.select(form.selected_segment);
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_formats(frame: &mut Frame, form: &FormState, area: Rect) {
    let Some(formats) = form.formats.as_ref() else {
        let empty = Paragraph::new("No resolutions fetched yet.")
            .style(Style::default().fg(MUTED))
            .block(panel_block("Resolutions", false));
        frame.render_widget(empty, area);
        return;
    };

    let mut selected = None;
    let rows: Vec<Row> = formats
        .entries()
        .enumerate()
        .map(|(idx, (label, format_id))| {
            if form.resolution.as_deref() == Some(label.as_str()) {
                selected = Some(idx);
            }
            Row::new(vec![Cell::from(label), Cell::from(format_id.to_string())])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(10), Constraint::Min(6)])
        .header(
            Row::new(vec!["Label", "Format"])
                .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .block(panel_block("Resolutions", form.focus == Field::Resolution))
        .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("● ");

    let mut state = TableState::default();
    state.select(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn panel_block(title: &'static str, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Rgb(125, 135, 150))
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(title)
}

fn modal_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title.to_string())
        .padding(Padding::new(2, 2, 1, 1))
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(140, 220, 150))
    } else {
        Style::default().fg(TEXT)
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 16, 24)));
    frame.render_widget(shadow_block, shadow);
}

/// Sized to the longest message line, within fixed bounds.
fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let min_width = 48.min(available_width);
    let max_width = 96.min(available_width);
    let width = max_line_width.saturating_add(12).clamp(min_width, max_width);

    let available_height = area.height.saturating_sub(2).max(1);
    let min_height = 9.min(available_height);
    let max_height = 24.min(available_height);
    let height = line_count.saturating_add(6).clamp(min_height, max_height);

    centered_fixed_rect(width, height, area)
}
