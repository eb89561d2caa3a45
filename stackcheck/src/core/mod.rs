//! Deterministic, pure logic shared by the checker.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! snapshots and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod expect;
pub mod graph;
pub mod invariants;
pub mod path;
pub mod pluck;
pub mod property;
pub mod urn;
