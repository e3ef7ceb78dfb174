//! Site backend module for HTTP communication

mod client;
mod traits;
mod types;

pub use client::{SiteClient, DEFAULT_BASE_URL};
pub use traits::SiteApi;
pub use types::*;

#[cfg(test)]
pub use traits::MockSiteApi;
