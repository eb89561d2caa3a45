//! Post-deployment validation of infrastructure resource graphs.
//!
//! This crate checks an already-applied stack: it loads the engine's exported
//! snapshot, orders and classifies its resources, and plucks values out of
//! their untyped outputs. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (property trees, path traversal,
//!   ordering, classification, assertions). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (snapshot files, case files, config).
//!
//! [`check`] coordinates core logic with I/O to evaluate case files.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod snapshot;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
