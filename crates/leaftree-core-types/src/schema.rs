//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across the tree service,
//! the node store and the logging macros.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_NODE_ID: &str = "node_id";
pub const FIELD_PARENT_ID: &str = "parent_id";
pub const FIELD_SLUG: &str = "slug";
pub const FIELD_KIND: &str = "kind";
pub const FIELD_PATH: &str = "path";
pub const FIELD_USER_ID: &str = "user_id";

// Tree-wide values
pub const FIELD_TREE_HASH: &str = "tree_hash";
pub const FIELD_CHILD_COUNT: &str = "child_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_DRIFT: &str = "drift";
pub const EVENT_MIGRATION: &str = "migration";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_NODE_ID.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
        assert_ne!(EVENT_DRIFT, EVENT_END_ERROR);
    }

    #[test]
    fn test_error_fields_match_macro_output() {
        // log_op_error! records these exact names
        assert_eq!(FIELD_ERR_KIND, "err_kind");
        assert_eq!(FIELD_ERR_CODE, "err_code");
    }
}
