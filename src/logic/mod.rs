//! Logic Module - Console Controllers & Store Client
//!
//! ## Layout
//! - `model/` - Decision records and wire types
//! - `store/` - `AuditStore` seam and its HTTP client
//! - `dashboard/`, `search/`, `ingest/`, `trace/` - one controller per view
//! - `lifecycle`, `navigation` - shared plumbing for the controllers

// Shared
pub mod model;
pub mod store;
pub mod lifecycle;
pub mod navigation;

// Controllers
pub mod dashboard;
pub mod search;
pub mod ingest;
pub mod trace;
