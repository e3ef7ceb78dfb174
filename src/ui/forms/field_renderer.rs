//! Field rendering utilities for forms

use crate::state::{FieldKind, FormField};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows a field takes on screen, borders included
pub fn field_height(field: &FormField) -> u16 {
    if field.is_multiline() {
        5
    } else {
        3
    }
}

/// Draw a form field
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };

    let border_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let display_str = field.display_value();
    let cursor = if is_active && field.kind != FieldKind::Choice {
        "▌"
    } else {
        ""
    };

    let content = if field.is_multiline() {
        let mut lines: Vec<Line> = display_str
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), style)))
            .collect();
        if is_active {
            if let Some(last) = lines.last_mut() {
                last.spans
                    .push(Span::styled(cursor, Style::default().fg(Color::Cyan)));
            }
        }
        Paragraph::new(lines)
    } else {
        let mut spans = vec![
            Span::styled(display_str, style),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ];
        if field.kind == FieldKind::File && !field.is_empty() && !field.file_exists() {
            spans.push(Span::styled(
                "  (file not found)",
                Style::default().fg(Color::Red),
            ));
        }
        Paragraph::new(Line::from(spans))
    };

    let marker = if field.required { "*" } else { "" };
    let block = Block::default()
        .title(format!(" {}{marker} ", field.label))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_fields_are_taller() {
        assert_eq!(field_height(&FormField::text("a", "A")), 3);
        assert_eq!(field_height(&FormField::multiline("b", "B")), 5);
    }
}
