//! Stable exit codes for terraval commands.

/// The command printed its JSON. Agent-level failures are data, not process failures.
pub const OK: i32 = 0;
/// Internal failure, e.g. the output could not be serialized.
pub const INTERNAL: i32 = 1;
/// Malformed input JSON, invalid feature values, unknown agent id, bad arguments or settings.
pub const INVALID_INPUT: i32 = 2;
