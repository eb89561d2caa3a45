//! I/O helpers for checker commands.

pub mod case;
pub mod config;
pub mod snapshot_store;
