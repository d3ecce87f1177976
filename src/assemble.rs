// 🚤 Record Assembler - Composite inspection graph out of typed fields
// Combines extracted fields and resolved catalog references into one
// InspectionRecord (unit + certificate + components + cylinders + tests),
// every child stamped with the same inspection id.
//
// The ONLY fatal condition here is a missing serial number - everything
// else degrades to partial data plus diagnostics.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::catalog::CatalogRegistry;
use crate::confidence::{ConfidenceScorer, Coverage, TableCoverage, REQUIRED_FIELDS};
use crate::diagnostics::{Diagnostic, DiagnosticCode, PipelineError};
use crate::fields::{
    extract_components, extract_cylinders, extract_label_fields, extract_tests, Condition,
    CylinderKind, FieldKey, FieldValue,
};
use crate::segment::{Section, SectionBlock};

// ============================================================================
// DOMAIN ENTITIES (storage-side shapes)
// ============================================================================

/// Unit (raft) - natural key: serial_number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub serial_number: String,
    pub brand_id: Option<String>,
    pub brand_name: Option<String>,
    pub model_id: Option<String>,
    pub model_name: Option<String>,
    pub capacity: Option<u32>,
    pub manufacture_date: Option<NaiveDate>,
    pub last_inspection_date: Option<NaiveDate>,
    pub next_inspection_date: Option<NaiveDate>,
    pub vessel_name: Option<String>,
    pub pack_type: Option<String>,
    pub status: String,
}

/// Certificate - natural key: number. Always references exactly one Unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub number: String,
    pub issue_date: Option<NaiveDate>,
    pub next_inspection_date: Option<NaiveDate>,
    pub unit_serial: String,
    pub technician: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentLocation {
    Interior,
    Exterior,
}

impl ComponentLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentLocation::Interior => "interior",
            ComponentLocation::Exterior => "exterior",
        }
    }
}

/// One attached component, belonging to one inspection event and one Unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub inspection_id: String,
    pub unit_serial: String,
    pub name: String,
    pub quantity: Option<u32>,
    pub condition: Condition,
    pub expiry_date: Option<NaiveDate>,
    pub location: ComponentLocation,
    pub notes: Option<String>,
}

/// Gas cylinder - natural key: serial_number (unique within the dataset)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cylinder {
    pub inspection_id: String,
    pub serial_number: String,
    pub kind: Option<CylinderKind>,
    pub pressure_bar: Option<f64>,
    pub gas: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub next_test_date: Option<NaiveDate>,
}

/// One performed test (NAP / F3 / QI / LOAD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub inspection_id: String,
    pub kind: String,
    pub test_date: Option<NaiveDate>,
    pub result: Option<String>,
    pub pressure_bar: Option<f64>,
}

// ============================================================================
// INSPECTION RECORD (the assembled graph)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    /// Shared identifier stamped on every component/cylinder/test
    pub inspection_id: String,
    pub inspected_at: Option<NaiveDate>,
    pub source_file: String,
    pub unit: Unit,
    pub certificate: Option<Certificate>,
    pub components: Vec<Component>,
    pub cylinders: Vec<Cylinder>,
    pub tests: Vec<TestResult>,
}

impl InspectionRecord {
    /// Content fingerprint for idempotent re-import detection. Excludes the
    /// per-import inspection id and source filename: two extractions of the
    /// same document bytes hash identically.
    pub fn fingerprint(&self) -> String {
        let components: Vec<_> = self
            .components
            .iter()
            .map(|c| (&c.name, c.quantity, c.condition, c.expiry_date, c.location))
            .collect();
        let cylinders: Vec<_> = self
            .cylinders
            .iter()
            .map(|c| (&c.serial_number, c.kind, c.pressure_bar, &c.gas, c.expiry_date, c.next_test_date))
            .collect();
        let tests: Vec<_> = self
            .tests
            .iter()
            .map(|t| (&t.kind, t.test_date, &t.result, t.pressure_bar))
            .collect();

        let payload = serde_json::json!({
            "unit": self.unit,
            "certificate": self.certificate,
            "inspected_at": self.inspected_at,
            "components": components,
            "cylinders": cylinders,
            "tests": tests,
        });

        let mut hasher = Sha256::new();
        hasher.update(payload.to_string());
        format!("{:x}", hasher.finalize())
    }
}

/// Ephemeral per-file result - never persisted as such
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub record: InspectionRecord,
    pub confidence: f64,
    pub needs_review: bool,
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// ASSEMBLER
// ============================================================================

pub struct RecordAssembler {
    scorer: ConfidenceScorer,
}

impl RecordAssembler {
    pub fn new() -> Self {
        RecordAssembler {
            scorer: ConfidenceScorer::new(),
        }
    }

    pub fn with_scorer(scorer: ConfidenceScorer) -> Self {
        RecordAssembler { scorer }
    }

    /// Assemble the composite record from segmented blocks, resolving
    /// brand/model text against the catalog registry.
    pub fn assemble(
        &self,
        blocks: &[SectionBlock],
        catalog: &mut CatalogRegistry,
        filename: &str,
    ) -> Result<ExtractionResult, PipelineError> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        // Label fields from identification/certificate blocks, plus the
        // preamble fallback for headerless grids. First occurrence wins.
        let mut fields: BTreeMap<FieldKey, FieldValue> = BTreeMap::new();
        for block in blocks {
            if block.section.is_label_section() || block.section == Section::Preamble {
                for (key, value) in extract_label_fields(block, &mut diagnostics) {
                    fields.entry(key).or_insert(value);
                }
            }
        }

        // Table rows
        let mut components: Vec<Component> = Vec::new();
        let mut cylinders: Vec<Cylinder> = Vec::new();
        let mut tests: Vec<TestResult> = Vec::new();
        let mut tables: Vec<TableCoverage> = Vec::new();

        for block in blocks {
            match block.section {
                Section::InteriorComponents | Section::ExteriorComponents => {
                    let location = if block.section == Section::InteriorComponents {
                        ComponentLocation::Interior
                    } else {
                        ComponentLocation::Exterior
                    };
                    let rows = extract_components(block, &mut diagnostics);
                    tables.push(TableCoverage {
                        section: block.section.as_str().to_string(),
                        rows: rows.len(),
                    });
                    components.extend(rows.into_iter().map(|row| Component {
                        inspection_id: String::new(),
                        unit_serial: String::new(),
                        name: row.name,
                        quantity: row.quantity,
                        condition: row.condition,
                        expiry_date: row.expiry_date,
                        location,
                        notes: row.notes,
                    }));
                }
                Section::Cylinders => {
                    let rows = extract_cylinders(block, &mut diagnostics);
                    tables.push(TableCoverage {
                        section: block.section.as_str().to_string(),
                        rows: rows.len(),
                    });
                    cylinders.extend(rows.into_iter().map(|row| Cylinder {
                        inspection_id: String::new(),
                        serial_number: row.serial_number,
                        kind: row.kind,
                        pressure_bar: row.pressure_bar,
                        gas: row.gas,
                        expiry_date: row.expiry_date,
                        next_test_date: row.next_test_date,
                    }));
                }
                Section::Tests => {
                    let rows = extract_tests(block, &mut diagnostics);
                    tables.push(TableCoverage {
                        section: block.section.as_str().to_string(),
                        rows: rows.len(),
                    });
                    tests.extend(rows.into_iter().map(|row| TestResult {
                        inspection_id: String::new(),
                        kind: row.kind,
                        test_date: row.test_date,
                        result: row.result,
                        pressure_bar: row.pressure_bar,
                    }));
                }
                _ => {}
            }
        }

        // The one non-negotiable field
        let serial_number = match fields.get(&FieldKey::SerialNumber).and_then(|v| v.as_text()) {
            Some(serial) => serial.to_string(),
            None => {
                return Err(PipelineError::IncompleteRecord {
                    file: filename.to_string(),
                })
            }
        };

        // Brand/model: combined string preferred, separate labels accepted
        let brand_model_text = fields
            .get(&FieldKey::BrandModel)
            .and_then(|v| v.as_text())
            .map(|s| s.to_string())
            .or_else(|| {
                let brand = fields.get(&FieldKey::Brand).and_then(|v| v.as_text())?;
                let model = fields.get(&FieldKey::Model).and_then(|v| v.as_text());
                Some(match model {
                    Some(model) => format!("{} {}", brand, model),
                    None => brand.to_string(),
                })
            });

        let resolution = brand_model_text
            .as_deref()
            .map(|text| catalog.resolve(text, &mut diagnostics));

        let inspected_at = fields
            .get(&FieldKey::InspectionDate)
            .and_then(|v| v.as_date());

        // Invariant: next inspection = last inspection + 1 year unless the
        // source explicitly supplies a different value
        let next_inspection = fields
            .get(&FieldKey::NextInspectionDate)
            .and_then(|v| v.as_date())
            .or_else(|| inspected_at.and_then(|d| d.checked_add_months(Months::new(12))));

        let unit = Unit {
            serial_number: serial_number.clone(),
            brand_id: resolution.as_ref().map(|r| r.brand_id.clone()),
            brand_name: resolution.as_ref().map(|r| r.brand_name.clone()),
            model_id: resolution.as_ref().and_then(|r| r.model_id.clone()),
            model_name: resolution.as_ref().and_then(|r| r.model_name.clone()),
            capacity: fields.get(&FieldKey::Capacity).and_then(|v| v.as_count()),
            manufacture_date: fields
                .get(&FieldKey::ManufactureDate)
                .and_then(|v| v.as_date()),
            last_inspection_date: inspected_at,
            next_inspection_date: next_inspection,
            vessel_name: fields
                .get(&FieldKey::VesselName)
                .and_then(|v| v.as_text())
                .map(|s| s.to_string()),
            pack_type: fields
                .get(&FieldKey::PackType)
                .and_then(|v| v.as_text())
                .map(|s| s.to_string()),
            status: "ativo".to_string(),
        };

        let certificate = fields
            .get(&FieldKey::CertificateNumber)
            .and_then(|v| v.as_text())
            .map(|number| Certificate {
                number: number.to_string(),
                issue_date: inspected_at,
                next_inspection_date: next_inspection,
                unit_serial: serial_number.clone(),
                technician: fields
                    .get(&FieldKey::Technician)
                    .and_then(|v| v.as_text())
                    .map(|s| s.to_string()),
            });

        // Coverage → confidence
        let required: Vec<(String, bool)> = REQUIRED_FIELDS
            .iter()
            .map(|field| {
                let recovered = match *field {
                    "serial_number" => true, // guaranteed above
                    "brand_model" => resolution.is_some(),
                    "capacity" => unit.capacity.is_some(),
                    "certificate_number" => certificate.is_some(),
                    "inspection_date" => inspected_at.is_some(),
                    _ => false,
                };
                (field.to_string(), recovered)
            })
            .collect();

        let coverage = Coverage { required, tables };
        for field in coverage.missing() {
            diagnostics.push(Diagnostic::missing(field));
        }

        let confidence = self.scorer.score(&coverage);
        let needs_review = self.scorer.needs_review(confidence);
        if needs_review {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::LowConfidence,
                "confidence",
                format!(
                    "score {:.2} below review threshold {:.2}",
                    confidence, self.scorer.review_threshold
                ),
            ));
        }

        // Stamp the shared inspection id on every child
        let inspection_id = uuid::Uuid::new_v4().to_string();
        let mut record = InspectionRecord {
            inspection_id: inspection_id.clone(),
            inspected_at,
            source_file: filename.to_string(),
            unit,
            certificate,
            components,
            cylinders,
            tests,
        };
        for component in &mut record.components {
            component.inspection_id = inspection_id.clone();
            component.unit_serial = serial_number.clone();
        }
        for cylinder in &mut record.cylinders {
            cylinder.inspection_id = inspection_id.clone();
        }
        for test in &mut record.tests {
            test.inspection_id = inspection_id.clone();
        }

        Ok(ExtractionResult {
            record,
            confidence,
            needs_review,
            diagnostics,
        })
    }
}

impl Default for RecordAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|r| r.to_string()).collect()
    }

    /// Minimal headerless grid: label/value rows only, no section headings
    fn scenario_one() -> Vec<String> {
        lines(&[
            "Número de Série | RFD12345",
            "Marca/Modelo | RFD SEASAVE PLUS R",
            "Lotação | 8",
            "Número do Certificado | AZ25-002",
            "Data de Inspeção | 07-01-2025",
        ])
    }

    #[test]
    fn test_round_trip_literal_values() {
        let blocks = segment(&scenario_one());
        let mut catalog = CatalogRegistry::new();
        let assembler = RecordAssembler::new();

        let result = assembler
            .assemble(&blocks, &mut catalog, "AZ25-002.xlsx")
            .unwrap();

        let unit = &result.record.unit;
        assert_eq!(unit.serial_number, "RFD12345");
        assert_eq!(unit.brand_name.as_deref(), Some("RFD"));
        assert_eq!(unit.model_name.as_deref(), Some("SEASAVE PLUS R"));
        assert_eq!(unit.capacity, Some(8));
        assert_eq!(
            unit.last_inspection_date,
            NaiveDate::from_ymd_opt(2025, 1, 7)
        );
        // Invariant: +1 year when the source does not supply one
        assert_eq!(
            unit.next_inspection_date,
            NaiveDate::from_ymd_opt(2026, 1, 7)
        );

        let certificate = result.record.certificate.as_ref().unwrap();
        assert_eq!(certificate.number, "AZ25-002");
        assert_eq!(certificate.issue_date, NaiveDate::from_ymd_opt(2025, 1, 7));
        assert_eq!(certificate.unit_serial, "RFD12345");

        assert!(result.confidence >= 0.9);
        assert!(!result.needs_review);
    }

    #[test]
    fn test_missing_capacity_degrades_not_fails() {
        let input = lines(&[
            "Número de Série | RFD12345",
            "Marca/Modelo | RFD SEASAVE PLUS R",
            "Número do Certificado | AZ25-002",
            "Data de Inspeção | 07-01-2025",
        ]);
        let blocks = segment(&input);
        let mut catalog = CatalogRegistry::new();
        let assembler = RecordAssembler::new();

        let full = assembler
            .assemble(&segment(&scenario_one()), &mut CatalogRegistry::new(), "a.xlsx")
            .unwrap();
        let degraded = assembler.assemble(&blocks, &mut catalog, "b.xlsx").unwrap();

        assert_eq!(degraded.record.unit.capacity, None);
        // Drops by exactly the identification-weight fraction (3/15)
        assert!((full.confidence - degraded.confidence - 0.2).abs() < 1e-9);
        assert!(degraded
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::MissingField && d.field == "capacity"));
    }

    #[test]
    fn test_missing_serial_is_fatal() {
        let input = lines(&["Marca/Modelo | RFD SEASAVE PLUS R", "Lotação | 8"]);
        let blocks = segment(&input);
        let mut catalog = CatalogRegistry::new();
        let assembler = RecordAssembler::new();

        let err = assembler
            .assemble(&blocks, &mut catalog, "sem-serie.xlsx")
            .unwrap_err();
        assert!(matches!(err, PipelineError::IncompleteRecord { .. }));
    }

    #[test]
    fn test_explicit_next_inspection_wins_over_invariant() {
        let input = lines(&[
            "Número de Série | RFD12345",
            "Data de Inspeção | 07-01-2025",
            "Data Próxima Inspeção | 15-06-2026",
        ]);
        let blocks = segment(&input);
        let mut catalog = CatalogRegistry::new();
        let result = RecordAssembler::new()
            .assemble(&blocks, &mut catalog, "a.xlsx")
            .unwrap();

        assert_eq!(
            result.record.unit.next_inspection_date,
            NaiveDate::from_ymd_opt(2026, 6, 15)
        );
    }

    #[test]
    fn test_children_share_one_inspection_id() {
        let input = lines(&[
            "Número de Série | RFD12345",
            "Data de Inspeção | 07-01-2025",
            "COMPONENTES INTERIORES",
            "Nome | Quantidade | Estado | Validade",
            "EPIRB | 1 | OK | 12/2026",
            "CILINDROS CO2",
            "Nº de Série | Tipo | Pressão (bar) | Gás | Validade | Data Próximo Teste",
            "17W63103 | CO2 | 57.25 | CO2 | 12/2026 | 12-12-2025",
        ]);
        let blocks = segment(&input);
        let mut catalog = CatalogRegistry::new();
        let result = RecordAssembler::new()
            .assemble(&blocks, &mut catalog, "a.xlsx")
            .unwrap();

        let record = &result.record;
        assert!(!record.inspection_id.is_empty());
        assert_eq!(record.components.len(), 1);
        assert_eq!(record.cylinders.len(), 1);
        assert_eq!(record.components[0].inspection_id, record.inspection_id);
        assert_eq!(record.cylinders[0].inspection_id, record.inspection_id);
        assert_eq!(record.components[0].unit_serial, "RFD12345");
    }

    #[test]
    fn test_fingerprint_stable_across_imports() {
        let blocks = segment(&scenario_one());
        let assembler = RecordAssembler::new();

        let first = assembler
            .assemble(&blocks, &mut CatalogRegistry::new(), "a.xlsx")
            .unwrap();
        let second = assembler
            .assemble(&blocks, &mut CatalogRegistry::new(), "b.xlsx")
            .unwrap();

        // Different inspection ids and filenames, identical content
        assert_ne!(first.record.inspection_id, second.record.inspection_id);
        assert_ne!(
            first.record.fingerprint(),
            "" // sanity
        );
        // brand/model ids are fresh uuids per registry, so compare the rest
        // through a shared registry instead
        let mut shared = CatalogRegistry::new();
        let a = assembler.assemble(&blocks, &mut shared, "a.xlsx").unwrap();
        let b = assembler.assemble(&blocks, &mut shared, "b.xlsx").unwrap();
        assert_eq!(a.record.fingerprint(), b.record.fingerprint());
    }
}
