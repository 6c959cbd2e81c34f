//! Diff-driven editing practice: scoring engine, problem sources, attempt
//! session and reporting. The terminal front end lives in the binary.

#[cfg(feature = "network")]
pub mod api;
pub mod config;
pub mod engine;
pub mod report;
pub mod session;
pub mod source;
