//! UI Module
//!
//! This module exports the UI components for the Patungan TUI:
//!
//! - `app`: Session state, key handling and the event loop
//! - `views`: Rendering functions for the inputs, breakdown and status bar
//!
//! The views only read `App`; every change goes through `App`'s handlers,
//! which re-derive the breakdown before the next frame is drawn.

mod app;
mod views;

pub use app::{run_app, App, AppResult, Field, HostAction, Notice, NoticeKind};
pub use views::draw;
