//! Form rendering module
//!
//! - `field_renderer`: bordered input fields
//! - `otp_row`: code cells and the resend countdown

mod field_renderer;
mod otp_row;

use super::components::{render_button, BUTTON_HEIGHT};
use crate::gate::GateState;
use crate::state::{FieldKind, FormFocus, VerifiedForm};
use field_renderer::{draw_field, field_height};
use otp_row::draw_otp_row;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const REQUEST_BUTTON_WIDTH: u16 = 28;
const SUBMIT_BUTTON_WIDTH: u16 = 24;

/// Draw a verified form: fields, code entry, submit button and banner
pub fn draw(frame: &mut Frame, area: Rect, form: &VerifiedForm) {
    let block = Block::default()
        .title(format!(" {} ", form.kind.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let otp_visible = form.gate.otp().visible;
    let mut constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|f| Constraint::Length(field_height(f)))
        .collect();
    if otp_visible {
        constraints.push(Constraint::Length(BUTTON_HEIGHT));
    }
    constraints.push(Constraint::Length(BUTTON_HEIGHT));
    constraints.push(Constraint::Length(2)); // Status banner
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let is_active = form.focus == FormFocus::Field(i);
        if field.kind == FieldKind::Email {
            draw_email_row(frame, chunks[i], form, i);
        } else {
            draw_field(frame, chunks[i], field, is_active);
        }
    }

    let mut row = form.fields.len();
    if otp_visible {
        draw_otp_row(
            frame,
            chunks[row],
            form.gate.otp(),
            form.focus == FormFocus::Otp,
            form.gate
                .timer_active()
                .then(|| form.gate.session().countdown_label())
                .flatten(),
        );
        row += 1;
    }

    draw_submit_row(frame, chunks[row], form);
    draw_status(frame, chunks[row + 1], form);
}

/// Email field with the request/resend button beside it
fn draw_email_row(frame: &mut Frame, area: Rect, form: &VerifiedForm, index: usize) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(REQUEST_BUTTON_WIDTH)])
        .split(area);

    let is_active = form.focus == FormFocus::Field(index);
    draw_field(frame, chunks[0], &form.fields[index], is_active);

    let session = form.gate.session();
    render_button(
        frame,
        chunks[1],
        session.request_label(),
        is_active,
        session.state.can_request_code(),
        Color::Yellow,
    );
}

fn draw_submit_row(frame: &mut Frame, area: Rect, form: &VerifiedForm) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SUBMIT_BUTTON_WIDTH), Constraint::Min(0)])
        .split(area);

    let state = form.gate.state();
    render_button(
        frame,
        chunks[0],
        form.dispatcher.label(&form.gate),
        form.focus == FormFocus::Submit,
        form.gate.submit_enabled(),
        Color::Green,
    );

    let (note, color) = match state {
        GateState::Verified | GateState::Submitting => {
            (format!("✓ {} verified", form.gate.session().email_address), Color::Green)
        }
        _ => (
            "Verify your email to enable submission".to_string(),
            Color::DarkGray,
        ),
    };
    let note_area = Rect {
        y: chunks[1].y + chunks[1].height.min(1),
        height: chunks[1].height.min(1),
        ..chunks[1]
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {note}"),
            Style::default().fg(color),
        ))),
        note_area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, form: &VerifiedForm) {
    let Some(status) = form.gate.status() else {
        return;
    };
    let color = if status.is_error() {
        Color::Red
    } else {
        Color::Green
    };
    let paragraph = Paragraph::new(status.text.as_str())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
