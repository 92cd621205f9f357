//! Audit Data Model
//!
//! Types shared by every controller and the store client.

pub mod types;
pub mod wire;


pub use types::*;
