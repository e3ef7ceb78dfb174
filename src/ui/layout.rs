//! Layout components (sidebar, status bar)

use super::components::{render_sidebar_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Create the main layout with sidebar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20), // Sidebar
            Constraint::Min(0),     // Main content
        ])
        .split(area);

    // Reserve bottom line for status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(chunks[1]);

    let sidebar_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(chunks[0]);

    (sidebar_chunks[0], main_chunks[0])
}

/// Draw the sidebar with one boxed button per view
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints = vec![Constraint::Min(0)];
    constraints.extend(View::ALL.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, view) in View::ALL.iter().enumerate() {
        render_sidebar_button(
            frame,
            chunks[idx + 1],
            &format!("F{}", view.hotkey()),
            view.label(),
            *view == app.state.current_view,
        );
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", app.state.base_url),
        Style::default().fg(Color::Blue),
    )];

    // Per-form verification state
    if let Some(form) = app.state.active_form() {
        let state = form.gate.state();
        let color = if form.gate.submit_enabled() {
            Color::Green
        } else {
            Color::Gray
        };
        spans.push(Span::raw("| "));
        spans.push(Span::styled(
            format!("{state} "),
            Style::default().fg(color),
        ));
    }

    spans.push(Span::raw("| "));
    spans.push(Span::styled(
        get_view_hints(app),
        Style::default().fg(Color::Black),
    ));

    let quit_hint = " ^C:quit ";

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view and focus
fn get_view_hints(app: &App) -> String {
    use crate::state::FormFocus;

    match app.state.active_form() {
        Some(form) if form.is_email_focused() => {
            format!("Enter:{}  Tab:next", form.gate.session().request_label())
        }
        Some(form) => match form.focus {
            FormFocus::Otp if form.gate.session().code_is_complete() => {
                "Enter:verify  ←/→:cell  Tab:next".to_string()
            }
            FormFocus::Otp => "0-9:code  ←/→:cell  Home/End  Tab:next".to_string(),
            FormFocus::Submit => "Enter:submit  Shift+Tab:back".to_string(),
            FormFocus::Field(_) => "Tab/Shift+Tab:field  F2-F4:view".to_string(),
        },
        None => "Enter:send  ↑/↓:scroll  Esc:clear  F2-F4:view".to_string(),
    }
}
