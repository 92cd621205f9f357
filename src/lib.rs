//! Decision Audit Console - controllers and store client for the audit log

pub mod api;
pub mod config;
pub mod constants;
pub mod logic;
