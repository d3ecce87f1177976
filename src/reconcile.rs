// 🔄 Reconciliation Writer - Idempotent merge-upsert of one extraction
// The ONLY stage that touches storage. Upserts by natural key and merges
// field-wise: an absent extracted field never erases a stored value.
//
// Re-importing the same document is a no-op: the inspection event is keyed
// by (unit, inspection date) and carries a content fingerprint, so an
// unchanged file short-circuits before any field-level writes.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::assemble::{Certificate, ExtractionResult, Unit};
use crate::catalog::CatalogRegistry;
use crate::diagnostics::{Diagnostic, DiagnosticCode, PipelineError};
use crate::repository::{InspectionEvent, InspectionRepository};

// ============================================================================
// OUTCOME
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOutcome {
    /// Fingerprint matched a stored event - nothing was rewritten
    pub unchanged: bool,
    pub created_unit: bool,
    pub created_certificate: bool,
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// WRITER
// ============================================================================

#[derive(Debug, Default)]
pub struct ReconciliationWriter;

impl ReconciliationWriter {
    pub fn new() -> Self {
        ReconciliationWriter
    }

    /// Persist one assembled extraction. Order matters: catalog entries
    /// first (units reference them), then the event identity check, then
    /// unit, certificate and event children.
    pub fn write<R: InspectionRepository>(
        &self,
        repository: &mut R,
        catalog: &mut CatalogRegistry,
        extraction: &ExtractionResult,
    ) -> Result<WriteOutcome, PipelineError> {
        let record = &extraction.record;
        let mut outcome = WriteOutcome::default();

        // Catalog entries provisioned during resolution. Persisted even when
        // the event itself turns out to be unchanged.
        let (new_brands, new_models) = catalog.take_pending();
        for brand in &new_brands {
            repository.create_brand(brand)?;
        }
        for model in &new_models {
            repository.create_model(model)?;
        }
        if !new_brands.is_empty() || !new_models.is_empty() {
            debug!(
                brands = new_brands.len(),
                models = new_models.len(),
                "persisted provisioned catalog entries"
            );
        }

        // Event identity: same unit + same inspection date = same event
        let stored_event =
            repository.find_event(&record.unit.serial_number, record.inspected_at)?;
        let fingerprint = record.fingerprint();

        if let Some(event) = &stored_event {
            if event.fingerprint == fingerprint {
                info!(
                    unit = %record.unit.serial_number,
                    file = %record.source_file,
                    "unchanged re-import, skipping"
                );
                outcome.unchanged = true;
                return Ok(outcome);
            }
        }

        // Re-imports of a changed document reuse the stored event id so the
        // children stay attached to one event, not duplicated under a new one
        let event_id = stored_event
            .as_ref()
            .map(|e| e.id.clone())
            .unwrap_or_else(|| record.inspection_id.clone());

        // Unit
        match repository.find_unit(&record.unit.serial_number)? {
            Some(stored) => {
                let merged = merge_unit(&stored, &record.unit);
                if merged != stored {
                    repository.update_unit(&merged)?;
                }
            }
            None => {
                repository.create_unit(&record.unit)?;
                outcome.created_unit = true;
            }
        }

        // Certificate
        if let Some(certificate) = &record.certificate {
            match repository.find_certificate(&certificate.number)? {
                Some(stored) => {
                    let mut merged = merge_certificate(&stored, certificate);
                    if stored.unit_serial != certificate.unit_serial {
                        // A certificate references exactly one unit. The
                        // stored linkage stays; the disagreement is surfaced.
                        merged.unit_serial = stored.unit_serial.clone();
                        warn!(
                            certificate = %certificate.number,
                            stored_unit = %stored.unit_serial,
                            incoming_unit = %certificate.unit_serial,
                            "certificate already linked to another unit"
                        );
                        outcome.diagnostics.push(Diagnostic::new(
                            DiagnosticCode::ReconciliationConflict,
                            "certificate",
                            format!(
                                "certificate '{}' stays linked to unit '{}'; incoming file names '{}'",
                                certificate.number, stored.unit_serial, certificate.unit_serial
                            ),
                        ));
                    }
                    if merged != stored {
                        repository.update_certificate(&merged)?;
                    }
                }
                None => {
                    repository.create_certificate(certificate)?;
                    outcome.created_certificate = true;
                }
            }
        }

        // Event children, re-stamped under the surviving event id
        let mut components = record.components.clone();
        for component in &mut components {
            component.inspection_id = event_id.clone();
        }
        repository.replace_components(&event_id, &components)?;

        let mut tests = record.tests.clone();
        for test in &mut tests {
            test.inspection_id = event_id.clone();
        }
        repository.replace_tests(&event_id, &tests)?;

        // Cylinders are shared assets keyed by their own serial number
        for cylinder in &record.cylinders {
            let mut incoming = cylinder.clone();
            incoming.inspection_id = event_id.clone();
            match repository.find_cylinder(&cylinder.serial_number)? {
                Some(stored) => {
                    let mut merged = stored.clone();
                    merged.inspection_id = event_id.clone();
                    if incoming.kind.is_some() {
                        merged.kind = incoming.kind;
                    }
                    if incoming.pressure_bar.is_some() {
                        merged.pressure_bar = incoming.pressure_bar;
                    }
                    if incoming.gas.is_some() {
                        merged.gas = incoming.gas.clone();
                    }
                    if incoming.expiry_date.is_some() {
                        merged.expiry_date = incoming.expiry_date;
                    }
                    if incoming.next_test_date.is_some() {
                        merged.next_test_date = incoming.next_test_date;
                    }
                    if merged != stored {
                        repository.update_cylinder(&merged)?;
                    }
                }
                None => repository.create_cylinder(&incoming)?,
            }
        }

        // Event row last: its fingerprint asserts everything above landed
        let event = InspectionEvent {
            id: event_id,
            unit_serial: record.unit.serial_number.clone(),
            inspected_at: record.inspected_at,
            fingerprint,
            source_file: record.source_file.clone(),
            imported_at: Utc::now(),
        };
        if stored_event.is_some() {
            repository.update_event(&event)?;
        } else {
            repository.create_event(&event)?;
        }

        Ok(outcome)
    }
}

// ============================================================================
// FIELD-WISE MERGING
// ============================================================================

/// Extracted Some overwrites, extracted None keeps the stored value
fn merge_unit(stored: &Unit, incoming: &Unit) -> Unit {
    Unit {
        serial_number: stored.serial_number.clone(),
        brand_id: incoming.brand_id.clone().or_else(|| stored.brand_id.clone()),
        brand_name: incoming
            .brand_name
            .clone()
            .or_else(|| stored.brand_name.clone()),
        model_id: incoming.model_id.clone().or_else(|| stored.model_id.clone()),
        model_name: incoming
            .model_name
            .clone()
            .or_else(|| stored.model_name.clone()),
        capacity: incoming.capacity.or(stored.capacity),
        manufacture_date: incoming.manufacture_date.or(stored.manufacture_date),
        last_inspection_date: incoming
            .last_inspection_date
            .or(stored.last_inspection_date),
        next_inspection_date: incoming
            .next_inspection_date
            .or(stored.next_inspection_date),
        vessel_name: incoming
            .vessel_name
            .clone()
            .or_else(|| stored.vessel_name.clone()),
        pack_type: incoming
            .pack_type
            .clone()
            .or_else(|| stored.pack_type.clone()),
        status: incoming.status.clone(),
    }
}

fn merge_certificate(stored: &Certificate, incoming: &Certificate) -> Certificate {
    Certificate {
        number: stored.number.clone(),
        issue_date: incoming.issue_date.or(stored.issue_date),
        next_inspection_date: incoming
            .next_inspection_date
            .or(stored.next_inspection_date),
        unit_serial: incoming.unit_serial.clone(),
        technician: incoming
            .technician
            .clone()
            .or_else(|| stored.technician.clone()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
