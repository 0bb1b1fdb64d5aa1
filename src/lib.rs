//! stubdb - An in-memory test double for relational database clients
//!
//! This crate provides a simulated database driver with:
//! - A typed, scrollable cursor over declared columns (with cycling)
//! - Prepared statements with ordered parameter binding and batches
//! - Pluggable query/update handlers selected by a detection predicate
//! - A process-wide, concurrency-safe handler registry

pub mod connection;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod handler;
pub mod rows;
pub mod statement;
pub mod types;
