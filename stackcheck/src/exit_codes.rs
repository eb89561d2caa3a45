//! Stable exit codes for checker CLI commands.

/// Command succeeded and every evaluated check passed.
pub const OK: i32 = 0;
/// Command failed due to unreadable input, invalid config/case or a broken snapshot
/// invariant. `check` also returns this when any case aborted.
pub const INVALID: i32 = 1;
/// `stackcheck check` evaluated at least one failing check.
pub const FAILED: i32 = 2;
/// `stackcheck pluck` found no resource or no value at the path.
pub const NOT_FOUND: i32 = 3;
