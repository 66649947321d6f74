//! Structured logging for the tree engine
//!
//! One initialization point (`init`) plus a small set of macros that
//! every public engine and store operation uses to emit start/end events
//! with a consistent field schema (see `leaftree_core_types::schema`).
//!
//! ```rust
//! use leaftree_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! - `log_op_start!(op, ...)` marks the start of an operation
//! - `log_op_end!(op, duration_ms = ...)` marks a successful end
//! - `log_op_error!(op, err, duration_ms = ...)` marks a failed end
//! - `log_drift!(node_id, path, reason)` reports tree/filesystem drift

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
