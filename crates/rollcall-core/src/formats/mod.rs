//! # Formats Module
//!
//! Serialization of the registry and the roster files that seed it.
//!
//! This module contains:
//! - Binary snapshot format (magic header + postcard)
//! - JSON export of the same snapshot
//! - JSON roster import
//!
//! File I/O stays in the app layer. Everything here converts between bytes
//! or text and registry data.

mod persistence;
mod roster;

pub use persistence::*;
pub use roster::*;
