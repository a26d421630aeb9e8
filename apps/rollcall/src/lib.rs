//! # Rollcall Library
//!
//! This library exposes the Rollcall command implementations for testing.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;

// Re-export rollcall_core for convenience
pub use rollcall_core;
