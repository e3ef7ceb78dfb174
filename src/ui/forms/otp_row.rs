//! Six code cells plus the resend countdown

use crate::gate::{OtpInputGroup, OTP_LENGTH};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const CELL_WIDTH: u16 = 5;

pub fn draw_otp_row(
    frame: &mut Frame,
    area: Rect,
    otp: &OtpInputGroup,
    is_active: bool,
    countdown: Option<String>,
) {
    let mut constraints = vec![Constraint::Length(CELL_WIDTH); OTP_LENGTH];
    constraints.push(Constraint::Length(2));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, cell) in otp.cells().iter().enumerate() {
        let focused = is_active && otp.focus() == i;
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else if cell.is_some() {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text = cell.map(String::from).unwrap_or_default();
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
        frame.render_widget(paragraph, chunks[i]);
    }

    let info_area = chunks[OTP_LENGTH + 1];
    let kind = if otp.digits_only() { "digit" } else { "character" };
    let mut lines = vec![Line::styled(
        format!("Enter the {OTP_LENGTH}-{kind} code from your email"),
        Style::default().fg(Color::Gray),
    )];
    if let Some(label) = countdown {
        lines.push(Line::styled(label, Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(
        Paragraph::new(lines),
        Rect {
            y: info_area.y + info_area.height.min(1),
            height: info_area.height.saturating_sub(1),
            ..info_area
        },
    );
}
