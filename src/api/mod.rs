//! API Module - Console Surface
//!
//! - `commands.rs`: one command per view, driving the controllers
//! - `render.rs`: plain-text rendering of view states

pub mod commands;
pub mod render;

pub use commands::{Console, OutputFormat};
