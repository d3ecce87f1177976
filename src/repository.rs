// 🗃️ Repository Port - The pipeline's only doorway to persistent state
// Find-by-natural-key, create, update. The Reconciliation Writer is the
// sole consumer; no extraction stage touches storage.
//
// Two implementations: SqliteRepository (db.rs) for the real store and
// MemoryRepository below for tests and dry runs.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::assemble::{Certificate, Component, Cylinder, TestResult, Unit};
use crate::catalog::{Brand, Model};

// ============================================================================
// INSPECTION EVENT
// ============================================================================

/// One import of one inspection document. Components/cylinders/tests hang
/// off this id; the fingerprint makes byte-identical re-imports detectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionEvent {
    pub id: String,
    pub unit_serial: String,
    pub inspected_at: Option<NaiveDate>,
    pub fingerprint: String,
    pub source_file: String,
    pub imported_at: DateTime<Utc>,
}

// ============================================================================
// PORT
// ============================================================================

pub trait InspectionRepository {
    // Catalog (never deleted)
    fn load_brands(&self) -> Result<Vec<Brand>>;
    fn load_models(&self) -> Result<Vec<Model>>;
    fn create_brand(&mut self, brand: &Brand) -> Result<()>;
    fn create_model(&mut self, model: &Model) -> Result<()>;

    // Units, by serial number
    fn find_unit(&self, serial_number: &str) -> Result<Option<Unit>>;
    fn create_unit(&mut self, unit: &Unit) -> Result<()>;
    fn update_unit(&mut self, unit: &Unit) -> Result<()>;

    // Certificates, by certificate number
    fn find_certificate(&self, number: &str) -> Result<Option<Certificate>>;
    fn create_certificate(&mut self, certificate: &Certificate) -> Result<()>;
    fn update_certificate(&mut self, certificate: &Certificate) -> Result<()>;

    // Inspection events, by (unit, inspection date)
    fn find_event(
        &self,
        unit_serial: &str,
        inspected_at: Option<NaiveDate>,
    ) -> Result<Option<InspectionEvent>>;
    fn create_event(&mut self, event: &InspectionEvent) -> Result<()>;
    fn update_event(&mut self, event: &InspectionEvent) -> Result<()>;

    // Event children: replaced wholesale under their event id
    fn replace_components(&mut self, inspection_id: &str, components: &[Component]) -> Result<()>;
    fn replace_tests(&mut self, inspection_id: &str, tests: &[TestResult]) -> Result<()>;

    // Cylinders, by serial number
    fn find_cylinder(&self, serial_number: &str) -> Result<Option<Cylinder>>;
    fn create_cylinder(&mut self, cylinder: &Cylinder) -> Result<()>;
    fn update_cylinder(&mut self, cylinder: &Cylinder) -> Result<()>;
}

// ============================================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryRepository {
    pub brands: Vec<Brand>,
    pub models: Vec<Model>,
    pub units: HashMap<String, Unit>,
    pub certificates: HashMap<String, Certificate>,
    pub events: Vec<InspectionEvent>,
    pub components: Vec<Component>,
    pub cylinders: HashMap<String, Cylinder>,
    pub tests: Vec<TestResult>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        MemoryRepository::default()
    }
}

impl InspectionRepository for MemoryRepository {
    fn load_brands(&self) -> Result<Vec<Brand>> {
        Ok(self.brands.clone())
    }

    fn load_models(&self) -> Result<Vec<Model>> {
        Ok(self.models.clone())
    }

    fn create_brand(&mut self, brand: &Brand) -> Result<()> {
        let name = brand.name.to_lowercase();
        if !self.brands.iter().any(|b| b.name.to_lowercase() == name) {
            let mut brand = brand.clone();
            brand.pending = false;
            self.brands.push(brand);
        }
        Ok(())
    }

    fn create_model(&mut self, model: &Model) -> Result<()> {
        let name = model.name.to_lowercase();
        if !self
            .models
            .iter()
            .any(|m| m.brand_id == model.brand_id && m.name.to_lowercase() == name)
        {
            let mut model = model.clone();
            model.pending = false;
            self.models.push(model);
        }
        Ok(())
    }

    fn find_unit(&self, serial_number: &str) -> Result<Option<Unit>> {
        Ok(self.units.get(serial_number).cloned())
    }

    fn create_unit(&mut self, unit: &Unit) -> Result<()> {
        self.units.insert(unit.serial_number.clone(), unit.clone());
        Ok(())
    }

    fn update_unit(&mut self, unit: &Unit) -> Result<()> {
        self.units.insert(unit.serial_number.clone(), unit.clone());
        Ok(())
    }

    fn find_certificate(&self, number: &str) -> Result<Option<Certificate>> {
        Ok(self.certificates.get(number).cloned())
    }

    fn create_certificate(&mut self, certificate: &Certificate) -> Result<()> {
        self.certificates
            .insert(certificate.number.clone(), certificate.clone());
        Ok(())
    }

    fn update_certificate(&mut self, certificate: &Certificate) -> Result<()> {
        self.certificates
            .insert(certificate.number.clone(), certificate.clone());
        Ok(())
    }

    fn find_event(
        &self,
        unit_serial: &str,
        inspected_at: Option<NaiveDate>,
    ) -> Result<Option<InspectionEvent>> {
        Ok(self
            .events
            .iter()
            .find(|e| e.unit_serial == unit_serial && e.inspected_at == inspected_at)
            .cloned())
    }

    fn create_event(&mut self, event: &InspectionEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn update_event(&mut self, event: &InspectionEvent) -> Result<()> {
        if let Some(stored) = self.events.iter_mut().find(|e| e.id == event.id) {
            *stored = event.clone();
        }
        Ok(())
    }

    fn replace_components(&mut self, inspection_id: &str, components: &[Component]) -> Result<()> {
        self.components.retain(|c| c.inspection_id != inspection_id);
        self.components.extend_from_slice(components);
        Ok(())
    }

    fn replace_tests(&mut self, inspection_id: &str, tests: &[TestResult]) -> Result<()> {
        self.tests.retain(|t| t.inspection_id != inspection_id);
        self.tests.extend_from_slice(tests);
        Ok(())
    }

    fn find_cylinder(&self, serial_number: &str) -> Result<Option<Cylinder>> {
        Ok(self.cylinders.get(serial_number).cloned())
    }

    fn create_cylinder(&mut self, cylinder: &Cylinder) -> Result<()> {
        self.cylinders
            .insert(cylinder.serial_number.clone(), cylinder.clone());
        Ok(())
    }

    fn update_cylinder(&mut self, cylinder: &Cylinder) -> Result<()> {
        self.cylinders
            .insert(cylinder.serial_number.clone(), cylinder.clone());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_brand_is_case_insensitive_idempotent() {
        let mut repo = MemoryRepository::new();
        let brand = Brand {
            id: "b1".to_string(),
            name: "ACME".to_string(),
            pending: true,
        };
        repo.create_brand(&brand).unwrap();

        let again = Brand {
            id: "b2".to_string(),
            name: "Acme".to_string(),
            pending: true,
        };
        repo.create_brand(&again).unwrap();

        assert_eq!(repo.brands.len(), 1);
        assert!(!repo.brands[0].pending);
    }

    #[test]
    fn test_replace_components_only_touches_one_event() {
        use crate::assemble::ComponentLocation;
        use crate::fields::Condition;

        let component = |event: &str, name: &str| Component {
            inspection_id: event.to_string(),
            unit_serial: "S1".to_string(),
            name: name.to_string(),
            quantity: Some(1),
            condition: Condition::Ok,
            expiry_date: None,
            location: ComponentLocation::Interior,
            notes: None,
        };

        let mut repo = MemoryRepository::new();
        repo.replace_components("e1", &[component("e1", "EPIRB")])
            .unwrap();
        repo.replace_components("e2", &[component("e2", "Luz")])
            .unwrap();
        repo.replace_components("e1", &[component("e1", "EPIRB"), component("e1", "HRU")])
            .unwrap();

        assert_eq!(repo.components.len(), 3);
        assert_eq!(
            repo.components
                .iter()
                .filter(|c| c.inspection_id == "e1")
                .count(),
            2
        );
    }
}
