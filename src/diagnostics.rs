// ⚠️ Diagnostics - Error taxonomy for the extraction pipeline
// Two layers: fatal PipelineError (aborts the current file only) and
// non-fatal Diagnostic entries that accumulate without stopping anything.
//
// Recoverable gaps NEVER raise - an unparsable date becomes Absent plus a
// FieldParseWarning. Only structural failures (no qualifying sheet, missing
// identity key) are fatal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FATAL ERRORS (per-file)
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No worksheet matched the inspection-grid convention
    #[error("no qualifying inspection sheet in '{file}'")]
    SheetNotFound { file: String },

    /// The absolute minimum identity key (serial number) is missing
    #[error("missing serial number in '{file}' - record cannot be identified")]
    IncompleteRecord { file: String },

    /// The workbook bytes could not be read at all
    #[error("unreadable workbook '{file}': {reason}")]
    Workbook { file: String, reason: String },

    /// Repository failure during reconciliation (fatal for this file only)
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

// ============================================================================
// NON-FATAL DIAGNOSTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A cell failed date/number parsing and was recorded as absent
    FieldParseWarning,

    /// Entity Resolver matched more than one catalog candidate
    AmbiguousMatchWarning,

    /// A required field was not recovered from the document
    MissingField,

    /// A brand or model was created on first encounter
    AutoProvisioned,

    /// Stored certificate linkage contradicts the import; linkage preserved
    ReconciliationConflict,

    /// Confidence fell below the review threshold
    LowConfidence,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::FieldParseWarning => "field_parse_warning",
            DiagnosticCode::AmbiguousMatchWarning => "ambiguous_match_warning",
            DiagnosticCode::MissingField => "missing_field",
            DiagnosticCode::AutoProvisioned => "auto_provisioned",
            DiagnosticCode::ReconciliationConflict => "reconciliation_conflict",
            DiagnosticCode::LowConfidence => "low_confidence",
        }
    }
}

/// One accumulated warning, surfaced to the caller in the file report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub field: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, field: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn parse_warning(field: &str, raw: &str) -> Self {
        Diagnostic::new(
            DiagnosticCode::FieldParseWarning,
            field,
            format!("could not parse '{}'", raw),
        )
    }

    pub fn missing(field: &str) -> Self {
        Diagnostic::new(
            DiagnosticCode::MissingField,
            field,
            format!("required field '{}' not recovered", field),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
