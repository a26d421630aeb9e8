//! # Storage Module
//!
//! Disk-backed registry storage using redb.
//!
//! Uses redb embedded database for:
//! - ACID transactions (a save replaces every table in one commit)
//! - Crash safety (copy-on-write B-trees)
//! - One table per record kind, values encoded with postcard

mod redb_store;

pub use redb_store::RedbStore;
