//! JSON output types for CLI responses.
//!
//! Every command writes exactly one JSON document to stdout. Responses carry a
//! `status` (`"ok"` or `"error"`) and the [`SCHEMA_VERSION`] they conform to.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, RectorError};

/// Current version of the response schema.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Errors
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (see [`OutputErrorCode`]).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a RectorError.
    pub fn from_error(err: &RectorError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let details = match err {
            RectorError::RewriteTableExhausted {
                rule,
                capability,
                member,
            } => Some(serde_json::json!({
                "rule": rule,
                "capability": capability,
                "member": member,
            })),
            RectorError::InvalidMutation { node, .. } | RectorError::UnknownNode { node } => {
                Some(serde_json::json!({ "node": node }))
            }
            RectorError::InputNotFound { path }
            | RectorError::Io { path, .. }
            | RectorError::Json { path, .. } => Some(serde_json::json!({ "path": path })),
            RectorError::Config { .. } => None,
        };
        ErrorInfo {
            code,
            message: err.to_string(),
            details,
        }
    }
}

/// Response emitted when a command fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a RectorError.
    pub fn new(err: &RectorError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Process command
// ============================================================================

/// One change applied by a rule, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// Identifier of the rule that fired.
    pub rule: String,
    /// Arena index of the node the rule was invoked on.
    pub node: u32,
    /// Kind of that node.
    pub kind: String,
    /// What happened: "replaced", "modified" or "deleted".
    pub action: String,
    /// Kind of the replacement node, for "replaced".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

/// Per-unit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    /// At least one rule changed the tree.
    Migrated,
    /// No rule matched.
    Unchanged,
    /// Processing stopped with an error; the input was left untouched.
    Aborted,
}

/// Outcome of processing one source unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitOutcome {
    /// Path of the serialized tree.
    pub path: String,
    /// Unit status.
    pub status: UnitStatus,
    /// Changes applied, in application order.
    pub changes: Vec<ChangeInfo>,
    /// Error that aborted the unit, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    /// Rendered source of the migrated tree (with `--emit php`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl UnitOutcome {
    /// Create the outcome of a unit that ran to completion.
    pub fn completed(path: impl Into<String>, changes: Vec<ChangeInfo>) -> Self {
        let status = if changes.is_empty() {
            UnitStatus::Unchanged
        } else {
            UnitStatus::Migrated
        };
        UnitOutcome {
            path: path.into(),
            status,
            changes,
            error: None,
            source: None,
        }
    }

    /// Create the outcome of an aborted unit.
    pub fn aborted(path: impl Into<String>, err: &RectorError) -> Self {
        UnitOutcome {
            path: path.into(),
            status: UnitStatus::Aborted,
            changes: Vec::new(),
            error: Some(ErrorInfo::from_error(err)),
            source: None,
        }
    }
}

/// Totals across all units of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub units: usize,
    pub migrated: usize,
    pub unchanged: usize,
    pub aborted: usize,
    pub changes: usize,
}

impl ProcessSummary {
    /// Compute totals from unit outcomes.
    pub fn from_outcomes(outcomes: &[UnitOutcome]) -> Self {
        let mut summary = ProcessSummary {
            units: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome.status {
                UnitStatus::Migrated => summary.migrated += 1,
                UnitStatus::Unchanged => summary.unchanged += 1,
                UnitStatus::Aborted => summary.aborted += 1,
            }
            summary.changes += outcome.changes.len();
        }
        summary
    }
}

/// Response for the process command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Status: "ok" when no unit aborted, "error" otherwise.
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Per-unit outcomes, in input order.
    pub units: Vec<UnitOutcome>,
    /// Totals.
    pub summary: ProcessSummary,
}

impl ProcessResponse {
    /// Build the response from unit outcomes.
    pub fn new(units: Vec<UnitOutcome>) -> Self {
        let summary = ProcessSummary::from_outcomes(&units);
        let status = if summary.aborted == 0 { "ok" } else { "error" };
        ProcessResponse {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            units,
            summary,
        }
    }
}

// ============================================================================
// Rules command
// ============================================================================

/// A before/after sample for a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleInfo {
    pub before: String,
    pub after: String,
}

/// Description of one registered rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: String,
    pub description: String,
    /// Node kinds the rule is dispatched on.
    pub interest: Vec<String>,
    pub samples: Vec<SampleInfo>,
}

/// Response for the rules command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesResponse {
    pub status: String,
    pub schema_version: String,
    pub rules: Vec<RuleInfo>,
}

impl RulesResponse {
    pub fn new(rules: Vec<RuleInfo>) -> Self {
        RulesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            rules,
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for the CLI. The output is deterministic:
/// same input produces identical bytes.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
