//! Error types and exit code constants for d8rector.
//!
//! `RectorError` is the single error type that crosses crate boundaries. Rules
//! never report "no match" or "malformed pattern" through it: those leave the
//! node unchanged. The only rewrite-time failure is
//! [`RectorError::RewriteTableExhausted`], which aborts the current source
//! unit and is reported by the host against that unit.
//!
//! ## Exit Codes
//!
//! - `2`: Invalid arguments or configuration
//! - `3`: Input not found or unreadable
//! - `6`: At least one source unit aborted with a rewrite table mismatch
//! - `10`: Internal errors (broken tree invariants)

use std::fmt;
use std::io;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or configuration from the caller.
    InvalidArguments = 2,
    /// Input could not be found or decoded.
    ResolutionError = 3,
    /// A rule recognized a capability member it has no rewrite for.
    RewriteAborted = 6,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the rewrite engine and its host.
#[derive(Debug, Error)]
pub enum RectorError {
    /// A capability member is in use but the rule has no rewrite for it.
    ///
    /// This means the rule's rewrite table is stale relative to the
    /// capability's real member list. Output for the unit would silently drop
    /// call semantics, so the unit is aborted.
    #[error("unhandled {member} method from {capability} trait (rule {rule})")]
    RewriteTableExhausted {
        rule: String,
        capability: String,
        member: String,
    },

    /// A mutation would corrupt the tree (e.g. deleting a required child).
    #[error("invalid mutation of node {node}: {reason}")]
    InvalidMutation { node: u32, reason: String },

    /// A node id does not exist in the arena.
    #[error("unknown node id {node}")]
    UnknownNode { node: u32 },

    /// Invalid run configuration.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Input path does not exist.
    #[error("input not found: {path}")]
    InputNotFound { path: String },

    /// IO failure while reading or writing a unit.
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A serialized tree or config file could not be decoded.
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for engine operations.
pub type RectorResult<T> = Result<T, RectorError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&RectorError> for OutputErrorCode {
    fn from(err: &RectorError) -> Self {
        match err {
            RectorError::RewriteTableExhausted { .. } => OutputErrorCode::RewriteAborted,
            RectorError::InvalidMutation { .. } => OutputErrorCode::InternalError,
            RectorError::UnknownNode { .. } => OutputErrorCode::InternalError,
            RectorError::Config { .. } => OutputErrorCode::InvalidArguments,
            RectorError::InputNotFound { .. } => OutputErrorCode::ResolutionError,
            RectorError::Io { .. } => OutputErrorCode::ResolutionError,
            RectorError::Json { .. } => OutputErrorCode::ResolutionError,
        }
    }
}

impl From<RectorError> for OutputErrorCode {
    fn from(err: RectorError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl RectorError {
    /// Create a rewrite table exhaustion error.
    pub fn unhandled_member(
        rule: impl Into<String>,
        capability: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        RectorError::RewriteTableExhausted {
            rule: rule.into(),
            capability: capability.into(),
            member: member.into(),
        }
    }

    /// Create an invalid mutation error.
    pub fn invalid_mutation(node: u32, reason: impl Into<String>) -> Self {
        RectorError::InvalidMutation {
            node,
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        RectorError::Config {
            message: message.into(),
        }
    }

    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        RectorError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON error with the path it occurred on.
    pub fn json(path: impl Into<String>, source: serde_json::Error) -> Self {
        RectorError::Json {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error aborts only the current unit.
    ///
    /// The host keeps processing other units after such an error.
    pub fn is_unit_fatal(&self) -> bool {
        matches!(self, RectorError::RewriteTableExhausted { .. })
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn rewrite_table_exhausted_maps_to_rewrite_aborted() {
            let err = RectorError::unhandled_member("url_generator_trait", "T", "foo");
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::RewriteAborted);
            assert_eq!(err.error_code().code(), 6);
            assert!(err.is_unit_fatal());
        }

        #[test]
        fn config_maps_to_invalid_arguments() {
            let err = RectorError::config("unknown rule 'nope'");
            assert_eq!(err.error_code().code(), 2);
            assert!(!err.is_unit_fatal());
        }

        #[test]
        fn invalid_mutation_maps_to_internal_error() {
            let err = RectorError::invalid_mutation(7, "cannot delete a required child");
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }

        #[test]
        fn input_errors_map_to_resolution_error() {
            let err = RectorError::InputNotFound {
                path: "missing.json".to_string(),
            };
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);

            let io_err = RectorError::io(
                "a.json",
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            );
            assert_eq!(io_err.error_code(), OutputErrorCode::ResolutionError);
        }
    }

    #[test]
    fn unhandled_member_message_names_member_and_trait() {
        let err = RectorError::unhandled_member(
            "url_generator_trait",
            "Drupal\\Core\\Routing\\UrlGeneratorTrait",
            "getRouteName",
        );
        let msg = err.to_string();
        assert!(msg.contains("getRouteName"));
        assert!(msg.contains("UrlGeneratorTrait"));
    }
}
