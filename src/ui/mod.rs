//! UI module for rendering the TUI

mod chat;
mod components;
mod forms;
mod layout;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Draw the main layout with sidebar
    let (sidebar_area, main_area) = layout::create_layout(area);

    layout::draw_sidebar(frame, sidebar_area, app);

    match app.state.current_view {
        View::Contact => forms::draw(frame, main_area, &app.state.contact),
        View::JobApplication => forms::draw(frame, main_area, &app.state.job),
        View::Assistant => chat::draw(frame, main_area, &mut app.state.chat),
    }

    layout::draw_status_bar(frame, app);
}
