// Quadro Import - Core Library
// Inspection-document extraction and reconciliation for safety-raft quadros.
// Exposes all pipeline stages for use in the CLI and tests.

pub mod assemble;
pub mod batch;
pub mod catalog;
pub mod confidence;
pub mod db;
pub mod diagnostics;
pub mod fields;
pub mod pipeline;
pub mod reconcile;
pub mod repository;
pub mod segment;
pub mod workbook;

// Re-export commonly used types
pub use assemble::{
    Certificate, Component, ComponentLocation, Cylinder, ExtractionResult, InspectionRecord,
    RecordAssembler, TestResult, Unit,
};
pub use batch::{
    BatchContent, BatchFile, BatchOrchestrator, BatchReport, FileReport, DEFAULT_DELAY_MS,
};
pub use catalog::{Brand, CatalogRegistry, Model, Resolution};
pub use confidence::{ConfidenceScorer, Coverage, TableCoverage, REQUIRED_FIELDS};
pub use db::{setup_database, SqliteRepository};
pub use diagnostics::{Diagnostic, DiagnosticCode, PipelineError};
pub use fields::{Condition, CylinderKind, FieldKey, FieldValue};
pub use pipeline::{extract, extract_from_lines};
pub use reconcile::{ReconciliationWriter, WriteOutcome};
pub use repository::{InspectionEvent, InspectionRepository, MemoryRepository};
pub use segment::{Section, SectionBlock};
pub use workbook::{load_grid, matrix_to_lines, SelectedSheet, SheetChoice};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
