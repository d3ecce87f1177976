// 📄 Workbook Loader - Sheet Selector + Cell Matrix Extractor
// Stage 1 picks the worksheet holding the inspection grid; stage 2 flattens
// its used range into ordered "a | b | c" text lines.
//
// Convention: summary sheet first, grid sheet second - so sheet index 1 is
// the fast path. The old hard dependency on that index broke on reordered
// and single-sheet workbooks, so the selection is now an explicit tagged
// decision with a keyword-scan fallback.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::diagnostics::PipelineError;
use crate::segment::{count_headings, SEPARATOR};

/// A scanned sheet needs at least this many distinct section headings to
/// qualify as an inspection grid. The conventional index-1 sheet is trusted
/// on a single heading.
const MIN_SCAN_HEADINGS: usize = 2;

// ============================================================================
// SHEET SELECTION
// ============================================================================

/// How the grid sheet was chosen - kept on the result for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetChoice {
    /// Second sheet, per the summary-first / grid-second convention
    ByIndex,
    /// First sheet found containing enough recognized headings
    ByContentScan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSheet {
    pub name: String,
    pub choice: SheetChoice,
    /// Ordered lines, one per row, cells joined with " | "; blank rows
    /// survive as empty lines. Row order is load-bearing for segmentation
    /// and field adjacency.
    pub lines: Vec<String>,
}

/// Open a workbook from its byte buffer and select the inspection grid sheet.
pub fn load_grid(bytes: &[u8], filename: &str) -> Result<SelectedSheet, PipelineError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| PipelineError::Workbook {
            file: filename.to_string(),
            reason: e.to_string(),
        })?;

    let sheet_names = workbook.sheet_names().to_owned();
    if sheet_names.is_empty() {
        return Err(PipelineError::SheetNotFound {
            file: filename.to_string(),
        });
    }

    // Fast path: the established convention puts the grid on the second
    // sheet. Any recognized heading there confirms the convention; only a
    // sheet with none of them falls through to the scan.
    if sheet_names.len() >= 2 {
        if let Ok(range) = workbook.worksheet_range(&sheet_names[1]) {
            let lines = flatten_range(&range);
            if count_headings(&lines) >= 1 {
                return Ok(SelectedSheet {
                    name: sheet_names[1].clone(),
                    choice: SheetChoice::ByIndex,
                    lines,
                });
            }
        }
    }

    // Fallback: scan every sheet in order for the first qualifying one
    for name in &sheet_names {
        let Ok(range) = workbook.worksheet_range(name) else {
            continue;
        };
        let lines = flatten_range(&range);
        if count_headings(&lines) >= MIN_SCAN_HEADINGS {
            return Ok(SelectedSheet {
                name: name.clone(),
                choice: SheetChoice::ByContentScan,
                lines,
            });
        }
    }

    Err(PipelineError::SheetNotFound {
        file: filename.to_string(),
    })
}

// ============================================================================
// CELL MATRIX EXTRACTION
// ============================================================================

/// Flatten a sheet's used range: trim every cell, drop blank cells from the
/// join. An entirely blank row becomes an empty line - the segmenter needs
/// it, because a blank row terminates a table body. Order preserved exactly.
fn flatten_range(range: &Range<Data>) -> Vec<String> {
    range
        .rows()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            join_row(&cells)
        })
        .collect()
}

/// Flatten an in-memory string matrix the same way the workbook path does.
/// This is the entry point for synthetic grids in tests and adapted CSV
/// input shaped by the ingestion collaborator.
pub fn matrix_to_lines(matrix: &[Vec<String>]) -> Vec<String> {
    matrix.iter().map(|row| join_row(row)).collect()
}

fn join_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<&str>>()
        .join(SEPARATOR)
}

/// Render one cell as trimmed text. Date-typed cells become DD-MM-YYYY so
/// they flow through the same date parser as plain text cells.
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format!("{}", f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "SIM" } else { "NÃO" }.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(_) => String::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_matrix_to_lines_joins_and_trims() {
        let matrix = vec![
            row(&["  Número de Série ", "RFD12345"]),
            row(&["", "", ""]),
            row(&["Lotação", "", "8"]),
        ];
        let lines = matrix_to_lines(&matrix);
        // The blank row survives as an empty line (table terminator)
        assert_eq!(
            lines,
            vec![
                "Número de Série | RFD12345".to_string(),
                String::new(),
                "Lotação | 8".to_string(),
            ]
        );
    }

    #[test]
    fn test_blank_cells_do_not_suppress_the_row() {
        // Blank middle cell drops out of the join, row survives
        let matrix = vec![row(&["EPIRB", "", "1", "", "OK"])];
        assert_eq!(matrix_to_lines(&matrix), vec!["EPIRB | 1 | OK".to_string()]);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let matrix = vec![row(&["b"]), row(&["a"]), row(&["c"])];
        assert_eq!(matrix_to_lines(&matrix), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_cell_text_numbers() {
        assert_eq!(cell_text(&Data::Float(57.25)), "57.25");
        assert_eq!(cell_text(&Data::Float(8.0)), "8");
        assert_eq!(cell_text(&Data::Int(12)), "12");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    // ------------------------------------------------------------------
    // Sheet selection against small checked-in workbooks
    // ------------------------------------------------------------------

    #[test]
    fn test_load_grid_prefers_second_sheet() {
        let bytes = include_bytes!("../tests/fixtures/grid_second_sheet.xlsx");
        let sheet = load_grid(bytes, "grid_second_sheet.xlsx").unwrap();

        assert_eq!(sheet.choice, SheetChoice::ByIndex);
        assert_eq!(sheet.name, "Quadro");
        assert!(sheet
            .lines
            .iter()
            .any(|l| l == "Número de Série | RFD12345"));
    }

    #[test]
    fn test_load_grid_trusts_index_with_a_single_heading() {
        // Only the CERTIFICADO heading is present on the second sheet -
        // the convention still holds, the strict bar is for the scan only
        let bytes = include_bytes!("../tests/fixtures/single_heading_second_sheet.xlsx");
        let sheet = load_grid(bytes, "single_heading_second_sheet.xlsx").unwrap();

        assert_eq!(sheet.choice, SheetChoice::ByIndex);
        assert_eq!(sheet.name, "Quadro");
        assert!(sheet
            .lines
            .iter()
            .any(|l| l == "Número do Certificado | AZ25-002"));
    }

    #[test]
    fn test_load_grid_scans_when_grid_is_first_sheet() {
        // Reordered workbook: grid first, notes second
        let bytes = include_bytes!("../tests/fixtures/grid_first_sheet.xlsx");
        let sheet = load_grid(bytes, "grid_first_sheet.xlsx").unwrap();

        assert_eq!(sheet.choice, SheetChoice::ByContentScan);
        assert_eq!(sheet.name, "Quadro");
    }

    #[test]
    fn test_load_grid_single_sheet_workbook() {
        let bytes = include_bytes!("../tests/fixtures/single_sheet_grid.xlsx");
        let sheet = load_grid(bytes, "single_sheet_grid.xlsx").unwrap();

        assert_eq!(sheet.choice, SheetChoice::ByContentScan);
        assert!(sheet
            .lines
            .iter()
            .any(|l| l == "Marca/Modelo | RFD SEASAVE PLUS R"));
    }

    #[test]
    fn test_load_grid_errors_without_inspection_sheet() {
        let bytes = include_bytes!("../tests/fixtures/no_grid.xlsx");
        let err = load_grid(bytes, "no_grid.xlsx").unwrap_err();
        assert!(matches!(err, PipelineError::SheetNotFound { .. }));
    }
}
