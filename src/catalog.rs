// 🏭 Catalog - Brand/Model reference entries + Entity Resolver
// Free-text "Marca/Modelo" strings ("RFD SEASAVE PLUS R") are resolved
// against the known catalog, or auto-provisioned on first encounter.
//
// The registry is an in-memory snapshot loaded once per batch. Resolution
// mutates it ONLY in memory - newly provisioned entries carry a pending
// flag and are persisted later by the Reconciliation Writer, which is the
// single stage allowed to touch storage. Catalog entries are never deleted.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::segment::normalize;

// ============================================================================
// CATALOG ENTRIES
// ============================================================================

/// Brand - natural key: name (unique, case-insensitive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    /// Provisioned this batch, not yet persisted
    #[serde(default)]
    pub pending: bool,
}

/// Model - natural key: (name, brand) composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub brand_id: String,
    #[serde(default)]
    pub pending: bool,
}

/// Outcome of resolving one brand/model string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub brand_id: String,
    pub brand_name: String,
    pub model_id: Option<String>,
    pub model_name: Option<String>,
    pub was_provisioned: bool,
}

// ============================================================================
// CATALOG REGISTRY
// ============================================================================

/// Ordered registry of known brands and models. Vec order IS insertion
/// order, which is the deterministic tie-breaker for ambiguous matches.
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    brands: Vec<Brand>,
    models: Vec<Model>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        CatalogRegistry::default()
    }

    /// Build from entries already in storage (earliest-created first)
    pub fn from_entries(brands: Vec<Brand>, models: Vec<Model>) -> Self {
        CatalogRegistry { brands, models }
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Drain entries provisioned since the last persist, clearing their
    /// pending flags. Called by the Reconciliation Writer.
    pub fn take_pending(&mut self) -> (Vec<Brand>, Vec<Model>) {
        let new_brands: Vec<Brand> = self.brands.iter().filter(|b| b.pending).cloned().collect();
        let new_models: Vec<Model> = self.models.iter().filter(|m| m.pending).cloned().collect();
        for brand in &mut self.brands {
            brand.pending = false;
        }
        for model in &mut self.models {
            model.pending = false;
        }
        (new_brands, new_models)
    }

    // ========================================================================
    // RESOLUTION: prefix → containment → provision
    // ========================================================================

    /// Resolve a raw brand/model string. Total: always returns a resolution,
    /// provisioning catalog entries when nothing matches.
    pub fn resolve(&mut self, raw: &str, diagnostics: &mut Vec<Diagnostic>) -> Resolution {
        let input = collapse(raw);
        let normalized = normalize(&input);

        // (a) whole brand name as a prefix of the string
        let prefix_hits: Vec<usize> = self
            .brands
            .iter()
            .enumerate()
            .filter(|(_, brand)| {
                let name = normalize(&brand.name);
                normalized == name
                    || (normalized.starts_with(&name)
                        && normalized[name.len()..].starts_with(' '))
            })
            .map(|(i, _)| i)
            .collect();

        if let Some(&index) = prefix_hits.first() {
            if prefix_hits.len() > 1 {
                diagnostics.push(ambiguous(raw, prefix_hits.len()));
            }
            let brand = self.brands[index].clone();
            let skip = input_chars_for(&input, normalize(&brand.name).chars().count());
            let remainder: String = input.chars().skip(skip).collect::<String>().trim().to_string();
            return self.finish(brand, remainder, false);
        }

        // (b) brand name contained anywhere in the string
        let containment_hits: Vec<usize> = self
            .brands
            .iter()
            .enumerate()
            .filter(|(_, brand)| normalized.contains(&normalize(&brand.name)))
            .map(|(i, _)| i)
            .collect();

        if let Some(&index) = containment_hits.first() {
            if containment_hits.len() > 1 {
                diagnostics.push(ambiguous(raw, containment_hits.len()));
            }
            let brand = self.brands[index].clone();
            let name = normalize(&brand.name);
            // Locate the match in normalized space, then map both ends back
            // to input char positions - uppercasing can expand a char, so
            // the two strings do not share char counts
            let byte_position = normalized.find(&name).unwrap_or(0);
            let start_norm = normalized[..byte_position].chars().count();
            let end_norm = start_norm + name.chars().count();
            let start = input_chars_for(&input, start_norm);
            let end = input_chars_for(&input, end_norm);
            let chars: Vec<char> = input.chars().collect();
            let before: String = chars[..start].iter().collect();
            let after: String = chars[end.min(chars.len())..].iter().collect();
            let mut remainder = before.trim().to_string();
            if !remainder.is_empty() && !after.trim().is_empty() {
                remainder.push(' ');
            }
            remainder.push_str(after.trim());
            return self.finish(brand, remainder, false);
        }

        // (c) nothing known: first token becomes the Brand, remainder the Model
        let mut parts = input.splitn(2, ' ');
        let brand_name = parts.next().unwrap_or(&input).to_string();
        let remainder = parts.next().unwrap_or("").trim().to_string();

        let brand = Brand {
            id: uuid::Uuid::new_v4().to_string(),
            name: brand_name.clone(),
            pending: true,
        };
        self.brands.push(brand.clone());
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::AutoProvisioned,
            "brand",
            format!("brand '{}' created from '{}'", brand_name, raw),
        ));

        self.finish(brand, remainder, true)
    }

    /// Attach (or provision) the model under the resolved brand
    fn finish(&mut self, brand: Brand, model_name: String, brand_provisioned: bool) -> Resolution {
        if model_name.is_empty() {
            return Resolution {
                brand_id: brand.id,
                brand_name: brand.name,
                model_id: None,
                model_name: None,
                was_provisioned: brand_provisioned,
            };
        }

        let normalized = normalize(&model_name);
        let existing = self
            .models
            .iter()
            .find(|m| m.brand_id == brand.id && normalize(&m.name) == normalized);

        let (model, model_provisioned) = match existing {
            Some(model) => (model.clone(), false),
            None => {
                let model = Model {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: model_name.clone(),
                    brand_id: brand.id.clone(),
                    pending: true,
                };
                self.models.push(model.clone());
                (model, true)
            }
        };

        Resolution {
            brand_id: brand.id,
            brand_name: brand.name,
            model_id: Some(model.id),
            model_name: Some(model.name),
            was_provisioned: brand_provisioned || model_provisioned,
        }
    }
}

fn collapse(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count the input chars that produce the first `normalized_len` chars of
/// normalize(input). Uppercasing is not 1:1 (ß becomes SS), so a char count
/// taken in normalized space must be walked back through the input.
fn input_chars_for(input: &str, normalized_len: usize) -> usize {
    let mut produced = 0;
    for (consumed, c) in input.chars().enumerate() {
        if produced >= normalized_len {
            return consumed;
        }
        produced += c.to_uppercase().count();
    }
    input.chars().count()
}

fn ambiguous(raw: &str, count: usize) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::AmbiguousMatchWarning,
        "brand_model",
        format!("'{}' matched {} catalog brands; earliest entry wins", raw, count),
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str) -> Brand {
        Brand {
            id: format!("brand-{}", name.to_lowercase()),
            name: name.to_string(),
            pending: false,
        }
    }

    #[test]
    fn test_prefix_match_splits_model() {
        let mut registry = CatalogRegistry::from_entries(vec![brand("RFD")], vec![]);
        let mut diagnostics = Vec::new();

        let resolution = registry.resolve("RFD SEASAVE PLUS R", &mut diagnostics);
        assert_eq!(resolution.brand_name, "RFD");
        assert_eq!(resolution.model_name.as_deref(), Some("SEASAVE PLUS R"));
        // Brand existed, model is new
        assert!(resolution.was_provisioned);

        // Same string again: nothing new is provisioned
        let again = registry.resolve("RFD SEASAVE PLUS R", &mut diagnostics);
        assert!(!again.was_provisioned);
        assert_eq!(again.model_id, resolution.model_id);
    }

    #[test]
    fn test_prefix_requires_word_boundary() {
        let mut registry = CatalogRegistry::from_entries(vec![brand("RFD")], vec![]);
        let mut diagnostics = Vec::new();

        // "RFDX" must not prefix-match brand RFD; it falls to provisioning
        let resolution = registry.resolve("RFDX 2000", &mut diagnostics);
        assert_eq!(resolution.brand_name, "RFDX");
        assert!(resolution.was_provisioned);
    }

    #[test]
    fn test_containment_match() {
        let mut registry = CatalogRegistry::from_entries(vec![brand("EUROVINIL")], vec![]);
        let mut diagnostics = Vec::new();

        let resolution = registry.resolve("SYNTESY EUROVINIL 10P", &mut diagnostics);
        assert_eq!(resolution.brand_name, "EUROVINIL");
        assert_eq!(resolution.model_name.as_deref(), Some("SYNTESY 10P"));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let mut registry = CatalogRegistry::from_entries(vec![brand("Zodiac")], vec![]);
        let mut diagnostics = Vec::new();

        let resolution = registry.resolve("ZODIAC OPEN SEA", &mut diagnostics);
        assert_eq!(resolution.brand_id, "brand-zodiac");
    }

    #[test]
    fn test_expanding_uppercase_keeps_model_aligned() {
        // ß uppercases to SS: the stored name is two chars longer than the
        // matching span of the raw input
        let mut registry = CatalogRegistry::from_entries(vec![brand("WEISSGROSS")], vec![]);
        let mut diagnostics = Vec::new();

        let resolution = registry.resolve("Weißgroß Marine", &mut diagnostics);
        assert_eq!(resolution.brand_name, "WEISSGROSS");
        assert_eq!(resolution.model_name.as_deref(), Some("Marine"));

        // Same expansion on the containment path
        let contained = registry.resolve("Jangada Weißgroß Marine 12P", &mut diagnostics);
        assert_eq!(contained.brand_name, "WEISSGROSS");
        assert_eq!(contained.model_name.as_deref(), Some("Jangada Marine 12P"));
    }

    #[test]
    fn test_auto_provisioning_creates_exactly_one_brand() {
        let mut registry = CatalogRegistry::new();
        let mut diagnostics = Vec::new();

        let first = registry.resolve("ACME X1", &mut diagnostics);
        assert_eq!(first.brand_name, "ACME");
        assert_eq!(first.model_name.as_deref(), Some("X1"));
        assert!(first.was_provisioned);

        // Second file referencing the same brand string reuses the entry
        let second = registry.resolve("ACME X1", &mut diagnostics);
        assert_eq!(second.brand_id, first.brand_id);
        assert!(!second.was_provisioned);
        assert_eq!(registry.brands().len(), 1);
    }

    #[test]
    fn test_ambiguous_match_is_deterministic() {
        // Both brands are contained in the input; earliest-created wins
        let mut registry =
            CatalogRegistry::from_entries(vec![brand("VIKING"), brand("SEASAVE")], vec![]);
        let mut diagnostics = Vec::new();

        let resolution = registry.resolve("RFD SEASAVE VIKING", &mut diagnostics);
        assert_eq!(resolution.brand_name, "VIKING");
        assert!(diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::AmbiguousMatchWarning));
    }

    #[test]
    fn test_take_pending_drains_once() {
        let mut registry = CatalogRegistry::new();
        let mut diagnostics = Vec::new();
        registry.resolve("ACME X1", &mut diagnostics);

        let (new_brands, new_models) = registry.take_pending();
        assert_eq!(new_brands.len(), 1);
        assert_eq!(new_models.len(), 1);

        let (again_brands, again_models) = registry.take_pending();
        assert!(again_brands.is_empty());
        assert!(again_models.is_empty());
    }

    #[test]
    fn test_brand_only_string_has_no_model() {
        let mut registry = CatalogRegistry::from_entries(vec![brand("RFD")], vec![]);
        let mut diagnostics = Vec::new();

        let resolution = registry.resolve("RFD", &mut diagnostics);
        assert_eq!(resolution.model_id, None);
        assert!(!resolution.was_provisioned);
    }
}
