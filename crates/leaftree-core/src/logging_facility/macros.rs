//! Operation logging macros
//!
//! All macros tag events with the calling module as `component` so the
//! env filter (`leaftree=debug`, `leaftree_store=info`, ...) applies per crate.

/// Log the start of an operation
///
/// ```
/// # use leaftree_core::log_op_start;
/// log_op_start!("create_node");
/// log_op_start!("create_node", parent_id = "root", slug = "docs");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = leaftree_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = leaftree_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use leaftree_core::log_op_end;
/// log_op_end!("create_node", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = leaftree_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = leaftree_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log a failed operation
///
/// `$err` is anything convertible into `ExError`; it is taken by value.
///
/// ```
/// # use leaftree_core::{log_op_error, errors::TreeError};
/// let err = TreeError::NodeNotFound { node_id: "n1".to_string() };
/// log_op_error!("get_node", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = leaftree_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            message = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = leaftree_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            message = ex_err.message(),
            $($field)*
        );
    }};
}

/// Report tree/filesystem drift at warn level
///
/// ```
/// # use leaftree_core::log_drift;
/// log_drift!("n1", "/data/root/a.md", "expected file missing");
/// ```
#[macro_export]
macro_rules! log_drift {
    ($node_id:expr, $path:expr, $reason:expr) => {
        tracing::warn!(
            component = module_path!(),
            event = leaftree_core_types::schema::EVENT_DRIFT,
            node_id = $node_id,
            path = %$path,
            reason = %$reason,
        );
    };
}
