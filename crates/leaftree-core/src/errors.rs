use thiserror::Error;

use crate::model::NodeKind;

/// Result type alias using TreeError
pub type Result<T> = std::result::Result<T, TreeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification of every failure the tree engine can report.
/// Each kind maps to a stable error code that boundary layers (HTTP
/// handlers, the CLI) use to pick a response without matching on the
/// concrete `TreeError` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Lookup
    NotFound,

    // Structural preconditions
    AlreadyExists,
    InvalidOperation,
    ConversionNotAllowed,
    InvalidSortOrder,
    CircularReference,
    SelfMove,
    HasChildren,
    InvalidSlug,
    InvalidPath,

    /// Tree and filesystem disagree about a node's existence or type
    Drift,

    // Content
    FrontmatterParse,
    InvariantViolation,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvalidOperation => "ERR_INVALID_OPERATION",
            ExErrorKind::ConversionNotAllowed => "ERR_CONVERSION_NOT_ALLOWED",
            ExErrorKind::InvalidSortOrder => "ERR_INVALID_SORT_ORDER",
            ExErrorKind::CircularReference => "ERR_CIRCULAR_REFERENCE",
            ExErrorKind::SelfMove => "ERR_SELF_MOVE",
            ExErrorKind::HasChildren => "ERR_HAS_CHILDREN",
            ExErrorKind::InvalidSlug => "ERR_INVALID_SLUG",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::Drift => "ERR_DRIFT",
            ExErrorKind::FrontmatterParse => "ERR_FRONTMATTER_PARSE",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a boundary layer should report this kind as a client error
    ///
    /// Lookup failures and violated preconditions are the caller's fault.
    /// Drift, IO and everything else is reported as a server error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::NotFound
                | ExErrorKind::AlreadyExists
                | ExErrorKind::InvalidOperation
                | ExErrorKind::InvalidSortOrder
                | ExErrorKind::ConversionNotAllowed
                | ExErrorKind::CircularReference
                | ExErrorKind::SelfMove
                | ExErrorKind::HasChildren
                | ExErrorKind::InvalidSlug
                | ExErrorKind::InvalidPath
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus whatever context the failing layer
/// knew about (operation, node id, filesystem path).
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    node_id: Option<String>,
    path: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            node_id: None,
            path: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add node ID context
    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Add filesystem or tree path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_client_error(&self) -> bool {
        self.kind.is_client_error()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(node_id) = &self.node_id {
            write!(f, " (node_id: {})", node_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    // ===== Lookup Errors =====
    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: String },

    #[error("Parent node not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    #[error("No node at path: {path}")]
    PathNotFound { path: String },

    // ===== Collision Errors =====
    #[error("Artifact already exists at {path}")]
    AlreadyExists { path: String },

    #[error("Parent {parent_id} already has a child with slug '{slug}'")]
    DuplicateSlug { parent_id: String, slug: String },

    // ===== Drift =====
    #[error("Drift detected for node {node_id} ({kind}) at {path}: {reason}")]
    Drift {
        node_id: String,
        kind: NodeKind,
        path: String,
        reason: String,
    },

    // ===== Precondition Errors =====
    #[error("Invalid operation {op}: {reason}")]
    InvalidOperation { op: String, reason: String },

    #[error("Conversion from {from} to {to} not allowed: {reason}")]
    ConversionNotAllowed {
        from: NodeKind,
        to: NodeKind,
        reason: String,
    },

    #[error("Invalid sort order: {reason}")]
    InvalidSortOrder { reason: String },

    #[error("Circular reference: node {node_id} cannot be moved under its descendant {target_parent_id}")]
    CircularReference {
        node_id: String,
        target_parent_id: String,
    },

    #[error("Node {node_id} cannot be moved into itself")]
    SelfMove { node_id: String },

    #[error("Node {node_id} has {child_count} children")]
    HasChildren { node_id: String, child_count: usize },

    #[error("Invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    // ===== Content Errors =====
    #[error("Frontmatter parse error: {message}")]
    FrontmatterParse { message: String },

    #[error("Tree invariant violated: {reason}")]
    InvariantViolation { reason: String },

    // ===== Generic Errors =====
    #[error("IO error during {op} on {path}: {message}")]
    Io {
        op: String,
        path: String,
        message: String,
    },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TreeError {
    /// Classification of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            TreeError::NodeNotFound { .. }
            | TreeError::ParentNotFound { .. }
            | TreeError::PathNotFound { .. } => ExErrorKind::NotFound,
            TreeError::AlreadyExists { .. } | TreeError::DuplicateSlug { .. } => {
                ExErrorKind::AlreadyExists
            }
            TreeError::Drift { .. } => ExErrorKind::Drift,
            TreeError::InvalidOperation { .. } => ExErrorKind::InvalidOperation,
            TreeError::ConversionNotAllowed { .. } => ExErrorKind::ConversionNotAllowed,
            TreeError::InvalidSortOrder { .. } => ExErrorKind::InvalidSortOrder,
            TreeError::CircularReference { .. } => ExErrorKind::CircularReference,
            TreeError::SelfMove { .. } => ExErrorKind::SelfMove,
            TreeError::HasChildren { .. } => ExErrorKind::HasChildren,
            TreeError::InvalidSlug { .. } => ExErrorKind::InvalidSlug,
            TreeError::InvalidPath { .. } => ExErrorKind::InvalidPath,
            TreeError::FrontmatterParse { .. } => ExErrorKind::FrontmatterParse,
            TreeError::InvariantViolation { .. } => ExErrorKind::InvariantViolation,
            TreeError::Io { .. } => ExErrorKind::Io,
            TreeError::Serialization { .. } => ExErrorKind::Serialization,
            TreeError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    pub fn is_drift(&self) -> bool {
        matches!(self, TreeError::Drift { .. })
    }

    /// Shorthand for `InvalidOperation`
    pub fn invalid_op(op: &str, reason: impl Into<String>) -> Self {
        TreeError::InvalidOperation {
            op: op.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<TreeError> for ExError {
    fn from(err: TreeError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let base = ExError::new(kind).with_message(message);

        match err {
            TreeError::NodeNotFound { node_id } => base.with_node_id(node_id),
            TreeError::ParentNotFound { parent_id } => {
                base.with_node_id(parent_id).with_op("find_parent")
            }
            TreeError::PathNotFound { path } => base.with_path(path),
            TreeError::AlreadyExists { path } => base.with_path(path),
            TreeError::DuplicateSlug { parent_id, .. } => base.with_node_id(parent_id),
            TreeError::Drift { node_id, path, .. } => base.with_node_id(node_id).with_path(path),
            TreeError::InvalidOperation { op, .. } => base.with_op(op),
            TreeError::CircularReference { node_id, .. }
            | TreeError::SelfMove { node_id }
            | TreeError::HasChildren { node_id, .. } => base.with_node_id(node_id),
            TreeError::InvalidPath { path, .. } => base.with_path(path),
            TreeError::Io { op, path, .. } => base.with_op(op).with_path(path),
            TreeError::ConversionNotAllowed { .. }
            | TreeError::InvalidSortOrder { .. }
            | TreeError::InvalidSlug { .. }
            | TreeError::FrontmatterParse { .. }
            | TreeError::InvariantViolation { .. }
            | TreeError::Serialization { .. }
            | TreeError::Internal { .. } => base,
        }
    }
}

/// Conversion from serde_json::Error to TreeError
impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        TreeError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from serde_yaml::Error to TreeError
impl From<serde_yaml::Error> for TreeError {
    fn from(err: serde_yaml::Error) -> Self {
        TreeError::FrontmatterParse {
            message: err.to_string(),
        }
    }
}
