//! Patungan: split a bill among friends from the terminal.
//!
//! - `split`: bill state and the derived breakdown
//! - `currency`: rupiah formatting
//! - `receipt`: share text and printable receipt
//! - `host`: share, clipboard and print facilities
//! - `config`: `~/.patungan/config.toml`
//! - `ui`: ratatui views and the interactive event loop

pub mod config;
pub mod currency;
pub mod host;
pub mod receipt;
pub mod split;
pub mod ui;
