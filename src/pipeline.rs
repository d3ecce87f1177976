// 🔬 Extraction Pipeline - Stages 1-7 composed, bytes → ExtractionResult
// Pure computation over in-memory data: no storage access happens before
// the Reconciliation Writer.

use tracing::debug;

use crate::assemble::{ExtractionResult, RecordAssembler};
use crate::catalog::CatalogRegistry;
use crate::diagnostics::PipelineError;
use crate::segment::segment;
use crate::workbook::load_grid;

/// Run sheet selection, matrix extraction, segmentation, field extraction,
/// entity resolution, scoring and assembly for one workbook.
pub fn extract(
    bytes: &[u8],
    filename: &str,
    catalog: &mut CatalogRegistry,
    assembler: &RecordAssembler,
) -> Result<ExtractionResult, PipelineError> {
    let sheet = load_grid(bytes, filename)?;
    debug!(
        file = filename,
        sheet = %sheet.name,
        choice = ?sheet.choice,
        rows = sheet.lines.len(),
        "selected inspection grid"
    );
    extract_from_lines(&sheet.lines, filename, catalog, assembler)
}

/// Stages 3-7 over an already-flattened line list. Entry point for
/// synthetic matrices (tests) and pre-adapted CSV input.
pub fn extract_from_lines(
    lines: &[String],
    filename: &str,
    catalog: &mut CatalogRegistry,
    assembler: &RecordAssembler,
) -> Result<ExtractionResult, PipelineError> {
    let blocks = segment(lines);
    assembler.assemble(&blocks, catalog, filename)
}
