// 🎯 Confidence Scorer - Weighted completeness over required vs recovered
// score = Σ(weight·recovered) / Σ(weight), in [0,1]. Identification and
// certificate fields weigh 3; component/cylinder/test rows weigh 1 each with
// a capped contribution, and a table section only enters the denominator
// when it exists in the document.
//
// Below the review threshold the record is still written - it is flagged
// for manual review instead. Partial data beats silent loss.

use serde::{Deserialize, Serialize};

/// Required fields that drive the score (weight `required_weight` each)
pub const REQUIRED_FIELDS: &[&str] = &[
    "serial_number",
    "brand_model",
    "capacity",
    "certificate_number",
    "inspection_date",
];

// ============================================================================
// COVERAGE (what the extractor recovered)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    /// (field, recovered) for every required field
    pub required: Vec<(String, bool)>,
    /// One entry per table section PRESENT in the document
    pub tables: Vec<TableCoverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCoverage {
    pub section: String,
    pub rows: usize,
}

impl Coverage {
    /// Required fields that were not recovered
    pub fn missing(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|(_, recovered)| !recovered)
            .map(|(field, _)| field.as_str())
            .collect()
    }
}

// ============================================================================
// SCORER
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceScorer {
    /// Weight of each identification/certificate required field
    pub required_weight: f64,

    /// Weight of one table row
    pub row_weight: f64,

    /// Maximum rows counted per table section
    pub row_cap: usize,

    /// Scores below this are flagged needs_review (never rejected)
    pub review_threshold: f64,
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        ConfidenceScorer {
            required_weight: 3.0,
            row_weight: 1.0,
            row_cap: 5,
            review_threshold: 0.5,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        ConfidenceScorer {
            review_threshold: threshold,
            ..ConfidenceScorer::new()
        }
    }

    /// Compute the completeness score in [0,1]
    pub fn score(&self, coverage: &Coverage) -> f64 {
        let mut recovered = 0.0;
        let mut total = 0.0;

        for (_, present) in &coverage.required {
            total += self.required_weight;
            if *present {
                recovered += self.required_weight;
            }
        }

        for table in &coverage.tables {
            total += self.row_weight * self.row_cap as f64;
            recovered += self.row_weight * table.rows.min(self.row_cap) as f64;
        }

        if total == 0.0 {
            return 0.0;
        }
        recovered / total
    }

    pub fn needs_review(&self, score: f64) -> bool {
        score < self.review_threshold
    }
}

impl Default for ConfidenceScorer {
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

    fn full_coverage() -> Coverage {
        Coverage {
            required: REQUIRED_FIELDS
                .iter()
                .map(|f| (f.to_string(), true))
                .collect(),
            tables: vec![],
        }
    }

    #[test]
    fn test_all_required_no_tables_scores_one() {
        let scorer = ConfidenceScorer::new();
        let score = scorer.score(&full_coverage());
        assert!((score - 1.0).abs() < 1e-9);
        assert!(!scorer.needs_review(score));
    }

    #[test]
    fn test_removing_any_required_field_strictly_decreases() {
        let scorer = ConfidenceScorer::new();
        let base = scorer.score(&full_coverage());

        for index in 0..REQUIRED_FIELDS.len() {
            let mut coverage = full_coverage();
            coverage.required[index].1 = false;
            let degraded = scorer.score(&coverage);
            assert!(
                degraded < base,
                "dropping {} did not lower the score",
                REQUIRED_FIELDS[index]
            );
            // weight 3 out of 15 → each field is a 0.2 fraction
            assert!((base - degraded - 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_table_rows_capped() {
        let scorer = ConfidenceScorer::new();

        let mut coverage = full_coverage();
        coverage.tables.push(TableCoverage {
            section: "interior_components".to_string(),
            rows: 12, // above the cap of 5
        });
        let score = scorer.score(&coverage);
        // 15 + 5 recovered over 15 + 5 total
        assert!((score - 1.0).abs() < 1e-9);

        coverage.tables[0].rows = 2;
        let partial = scorer.score(&coverage);
        assert!((partial - 17.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_flags_review() {
        let scorer = ConfidenceScorer::new();
        let mut coverage = full_coverage();
        for entry in coverage.required.iter_mut().take(4) {
            entry.1 = false;
        }
        let score = scorer.score(&coverage); // 3/15 = 0.2
        assert!(scorer.needs_review(score));

        let lenient = ConfidenceScorer::with_threshold(0.1);
        assert!(!lenient.needs_review(score));
    }

    #[test]
    fn test_empty_coverage_scores_zero() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&Coverage::default()), 0.0);
    }
}
