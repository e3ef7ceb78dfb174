//! Application state module

mod app_state;
mod chat;
mod forms;

pub use app_state::*;
pub use chat::*;
pub use forms::*;
