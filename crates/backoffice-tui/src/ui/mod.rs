//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, title bar with the session countdown, overlays
//! - `input`: keyboard event handling
//! - `styles`: color palette and text styling
//! - `tabs`: per-view content rendering

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
