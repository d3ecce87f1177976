// 📦 Batch Orchestrator - Sequential import of many inspection documents
// One catalog snapshot per batch, one repository, a pacing delay between
// files. A failed file is reported and skipped; it never aborts the batch.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::assemble::{Certificate, Component, Cylinder, RecordAssembler, TestResult, Unit};
use crate::catalog::CatalogRegistry;
use crate::diagnostics::Diagnostic;
use crate::pipeline::{extract, extract_from_lines};
use crate::reconcile::ReconciliationWriter;
use crate::repository::InspectionRepository;

/// Pause between files, matching the pace of manual uploads
pub const DEFAULT_DELAY_MS: u64 = 1000;

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone)]
pub enum BatchContent {
    /// Raw workbook bytes (.xlsx/.xls)
    Workbook(Vec<u8>),
    /// Pre-flattened grid lines (synthetic input, adapted CSV)
    Lines(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct BatchFile {
    pub name: String,
    pub content: BatchContent,
}

impl BatchFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(BatchFile {
            name,
            content: BatchContent::Workbook(bytes),
        })
    }

    pub fn from_lines(name: &str, lines: Vec<String>) -> Self {
        BatchFile {
            name: name.to_string(),
            content: BatchContent::Lines(lines),
        }
    }
}

// ============================================================================
// REPORTS
// ============================================================================

/// Per-file slice of the batch report. Carries the assembled records
/// themselves, not just counts - the JSON output is the machine-readable
/// product of the import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file: String,
    pub success: bool,
    /// Fingerprint matched a stored event; nothing was written
    pub unchanged: bool,
    pub confidence: f64,
    pub needs_review: bool,
    pub unit: Option<Unit>,
    pub certificate: Option<Certificate>,
    pub components: Vec<Component>,
    pub cylinders: Vec<Cylinder>,
    pub tests: Vec<TestResult>,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: Vec<String>,
}

impl FileReport {
    fn failed(file: &str, error: String) -> Self {
        FileReport {
            file: file.to_string(),
            success: false,
            unchanged: false,
            confidence: 0.0,
            needs_review: false,
            unit: None,
            certificate: None,
            components: Vec::new(),
            cylinders: Vec::new(),
            tests: Vec::new(),
            diagnostics: Vec::new(),
            errors: vec![error],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub unchanged: usize,
    pub needs_review: usize,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    fn from_files(files: Vec<FileReport>) -> Self {
        BatchReport {
            total_files: files.len(),
            succeeded: files.iter().filter(|f| f.success).count(),
            failed: files.iter().filter(|f| !f.success).count(),
            unchanged: files.iter().filter(|f| f.unchanged).count(),
            needs_review: files.iter().filter(|f| f.success && f.needs_review).count(),
            files,
        }
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

pub struct BatchOrchestrator<R: InspectionRepository> {
    repository: R,
    assembler: RecordAssembler,
    writer: ReconciliationWriter,
    delay: Duration,
}

impl<R: InspectionRepository> BatchOrchestrator<R> {
    pub fn new(repository: R) -> Self {
        BatchOrchestrator {
            repository,
            assembler: RecordAssembler::new(),
            writer: ReconciliationWriter::new(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_assembler(mut self, assembler: RecordAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Import every file in order. The catalog is loaded once and carried
    /// across the whole batch, so a brand provisioned by file 1 resolves
    /// file 7 without a round trip.
    pub fn run(&mut self, files: &[BatchFile]) -> Result<BatchReport> {
        let mut catalog = CatalogRegistry::from_entries(
            self.repository.load_brands()?,
            self.repository.load_models()?,
        );
        info!(
            files = files.len(),
            brands = catalog.brands().len(),
            "starting batch import"
        );

        let mut reports = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            reports.push(self.import_one(&mut catalog, file));
        }

        let report = BatchReport::from_files(reports);
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            unchanged = report.unchanged,
            "batch finished"
        );
        Ok(report)
    }

    fn import_one(&mut self, catalog: &mut CatalogRegistry, file: &BatchFile) -> FileReport {
        let extraction = match &file.content {
            BatchContent::Workbook(bytes) => {
                extract(bytes, &file.name, catalog, &self.assembler)
            }
            BatchContent::Lines(lines) => {
                extract_from_lines(lines, &file.name, catalog, &self.assembler)
            }
        };

        let extraction = match extraction {
            Ok(extraction) => extraction,
            Err(err) => {
                warn!(file = %file.name, error = %err, "extraction failed");
                return FileReport::failed(&file.name, err.to_string());
            }
        };

        let outcome = match self
            .writer
            .write(&mut self.repository, catalog, &extraction)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(file = %file.name, error = %err, "reconciliation failed");
                return FileReport::failed(&file.name, err.to_string());
            }
        };

        let record = &extraction.record;
        let mut diagnostics = extraction.diagnostics.clone();
        diagnostics.extend(outcome.diagnostics.clone());

        FileReport {
            file: file.name.clone(),
            success: true,
            unchanged: outcome.unchanged,
            confidence: extraction.confidence,
            needs_review: extraction.needs_review,
            unit: Some(record.unit.clone()),
            certificate: record.certificate.clone(),
            components: record.components.clone(),
            cylinders: record.cylinders.clone(),
            tests: record.tests.clone(),
            diagnostics,
            errors: Vec::new(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|r| r.to_string()).collect()
    }

    fn orchestrator() -> BatchOrchestrator<MemoryRepository> {
        BatchOrchestrator::new(MemoryRepository::new()).with_delay(Duration::ZERO)
    }

    #[test]
    fn test_failed_file_does_not_abort_batch() {
        let files = vec![
            BatchFile::from_lines(
                "good.xlsx",
                lines(&[
                    "Número de Série | RFD12345",
                    "Número do Certificado | AZ25-002",
                    "Data de Inspeção | 07-01-2025",
                ]),
            ),
            // No serial number: fatal for this file only
            BatchFile::from_lines("bad.xlsx", lines(&["Lotação | 8"])),
            BatchFile::from_lines(
                "also-good.xlsx",
                lines(&[
                    "Número de Série | ZOD55555",
                    "Número do Certificado | AZ25-003",
                    "Data de Inspeção | 08-01-2025",
                ]),
            ),
        ];

        let mut orchestrator = orchestrator();
        let report = orchestrator.run(&files).unwrap();

        assert_eq!(report.total_files, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.files[1].success);
        assert!(!report.files[1].errors.is_empty());
        assert_eq!(orchestrator.repository().units.len(), 2);
    }

    #[test]
    fn test_catalog_carries_across_batch() {
        let files = vec![
            BatchFile::from_lines(
                "a.xlsx",
                lines(&[
                    "Número de Série | RFD11111",
                    "Marca/Modelo | RFD SEASAVE PLUS R",
                    "Data de Inspeção | 07-01-2025",
                ]),
            ),
            BatchFile::from_lines(
                "b.xlsx",
                lines(&[
                    "Número de Série | RFD22222",
                    "Marca/Modelo | RFD SEASAVE PLUS R",
                    "Data de Inspeção | 08-01-2025",
                ]),
            ),
        ];

        let mut orchestrator = orchestrator();
        orchestrator.run(&files).unwrap();

        let repo = orchestrator.repository();
        assert_eq!(repo.brands.len(), 1);
        assert_eq!(repo.models.len(), 1);
        assert_eq!(
            repo.units["RFD11111"].brand_id,
            repo.units["RFD22222"].brand_id
        );
    }

    #[test]
    fn test_duplicate_file_in_batch_counts_unchanged() {
        let rows = lines(&[
            "Número de Série | RFD12345",
            "Número do Certificado | AZ25-002",
            "Data de Inspeção | 07-01-2025",
        ]);
        let files = vec![
            BatchFile::from_lines("a.xlsx", rows.clone()),
            BatchFile::from_lines("a (copy).xlsx", rows),
        ];

        let mut orchestrator = orchestrator();
        let report = orchestrator.run(&files).unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.unchanged, 1);
        assert_eq!(orchestrator.repository().events.len(), 1);
    }

    #[test]
    fn test_report_embeds_assembled_records() {
        let files = vec![BatchFile::from_lines(
            "full.xlsx",
            lines(&[
                "QUADRO DE INSPEÇÃO DA JANGADA",
                "Número de Série | RFD12345",
                "Marca/Modelo | RFD SEASAVE PLUS R",
                "Lotação | 8",
                "CERTIFICADO:",
                "Número do Certificado | AZ25-002",
                "Data de Inspeção | 07-01-2025",
                "COMPONENTES INTERIORES",
                "Componente | Qtd | Estado",
                "Kit de primeiros socorros | 1 | BOM",
            ]),
        )];

        let mut orchestrator = orchestrator();
        let report = orchestrator.run(&files).unwrap();
        let value = serde_json::to_value(&report).unwrap();

        let file = &value["files"][0];
        assert_eq!(file["unit"]["serialNumber"], "RFD12345");
        assert_eq!(file["unit"]["capacity"], 8);
        assert_eq!(file["certificate"]["number"], "AZ25-002");
        assert_eq!(file["certificate"]["unitSerial"], "RFD12345");
        assert_eq!(
            file["components"][0]["name"],
            "Kit de primeiros socorros"
        );
        assert_eq!(file["components"][0]["location"], "interior");
        assert!(file["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_report_counts_needs_review() {
        // Serial only: score 3/15, below the 0.5 threshold
        let files = vec![BatchFile::from_lines(
            "sparse.xlsx",
            lines(&["Número de Série | RFD12345"]),
        )];

        let mut orchestrator = orchestrator();
        let report = orchestrator.run(&files).unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.needs_review, 1);
        assert!(report.files[0].needs_review);
    }
}
