//! Reusable UI components

mod button;

pub use button::{render_button, render_sidebar_button, BUTTON_HEIGHT};
