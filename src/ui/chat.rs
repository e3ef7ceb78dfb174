//! Assistant chat view

use crate::state::{ChatRole, ChatState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, chat: &mut ChatState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    draw_history(frame, chunks[0], chat);
    draw_input(frame, chunks[1], chat);
}

fn draw_history(frame: &mut Frame, area: Rect, chat: &mut ChatState) {
    let mut lines: Vec<Line> = Vec::new();
    for message in &chat.messages {
        let (who, color) = match message.role {
            ChatRole::User => ("You", Color::Cyan),
            ChatRole::Assistant => ("Assistant", Color::Green),
        };
        lines.push(Line::from(vec![
            Span::styled(
                who,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", message.sent_at.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.extend(message.text.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::default());
    }
    if chat.awaiting_reply {
        lines.push(Line::styled(
            "Assistant is typing...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default()
        .title(" Assistant ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Keep the newest rows in view, minus however far the user scrolled up.
    // Heights are in wrapped rows, not logical lines.
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = u16::try_from(paragraph.line_count(inner.width)).unwrap_or(u16::MAX);
    chat.set_max_scroll(total.saturating_sub(inner.height));
    let offset = chat.max_scroll - chat.scroll;

    frame.render_widget(paragraph.scroll((offset, 0)), inner);
}

fn draw_input(frame: &mut Frame, area: Rect, chat: &ChatState) {
    let border = if chat.awaiting_reply {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let paragraph = Paragraph::new(Line::from(vec![
        Span::raw(chat.input.as_str()),
        Span::styled("▌", Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .title(" Message ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(chat: &mut ChatState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw(frame, area, chat);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn long_conversation() -> ChatState {
        let mut chat = ChatState::new();
        for i in 0..3 {
            chat.input = format!("Question {i} about the services on offer and their pricing");
            chat.begin_send();
            chat.complete(Ok(format!(
                "A long answer that wraps across several rows of the history pane LASTREPLY{i}"
            )));
        }
        chat
    }

    #[test]
    fn test_newest_reply_visible_when_messages_wrap() {
        let mut chat = long_conversation();
        let screen = render(&mut chat);
        assert!(screen.contains("LASTREPLY2"));
        assert!(chat.max_scroll > 0);
        assert_eq!(chat.scroll, 0);
    }

    #[test]
    fn test_scroll_is_clamped_to_history() {
        let mut chat = long_conversation();
        chat.scroll = 500;
        let screen = render(&mut chat);
        assert_eq!(chat.scroll, chat.max_scroll);
        assert!(screen.contains("Hello!"));
        assert!(!screen.contains("LASTREPLY2"));
    }
}
