// 🧩 Section Segmenter - Heading-driven partitioning of the flattened grid
// Splits the ordered line list into labeled blocks (identification,
// certificate, components, cylinders, tests) by matching heading keywords.
//
// Every line is classified ONCE into a tagged variant here; downstream
// stages pattern-match on the variant instead of re-inspecting raw cells.
// Extraction is heading-driven, not line-number-driven, so inserted blank
// rows or reordered sections do not break it.

use serde::{Deserialize, Serialize};

/// Cell separator used by the matrix extractor when joining a row
pub const SEPARATOR: &str = " | ";

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// Lines before the first recognized heading - ignored for extraction
    Preamble,
    Identification,
    Certificate,
    InteriorComponents,
    ExteriorComponents,
    Cylinders,
    Tests,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Preamble => "preamble",
            Section::Identification => "identification",
            Section::Certificate => "certificate",
            Section::InteriorComponents => "interior_components",
            Section::ExteriorComponents => "exterior_components",
            Section::Cylinders => "cylinders",
            Section::Tests => "tests",
        }
    }

    /// Label/value sections are read as `label | value` pairs
    pub fn is_label_section(&self) -> bool {
        matches!(self, Section::Identification | Section::Certificate)
    }

    /// Table sections are read as header row + positional data rows
    pub fn is_table_section(&self) -> bool {
        matches!(
            self,
            Section::InteriorComponents
                | Section::ExteriorComponents
                | Section::Cylinders
                | Section::Tests
        )
    }
}

// ============================================================================
// HEADING KEYWORD TABLE (rules as data)
// ============================================================================

/// Keyword → section, tried in order, matched by containment on the
/// normalized (uppercased, diacritic-stripped) line. Longer/more specific
/// keywords come first.
const HEADING_RULES: &[(&str, Section)] = &[
    ("COMPONENTES INTERIORES", Section::InteriorComponents),
    ("COMPONENTES EXTERIORES", Section::ExteriorComponents),
    ("QUADRO DE INSPECAO", Section::Identification),
    ("IDENTIFICACAO", Section::Identification),
    ("JANGADA", Section::Identification),
    ("CERTIFICADO", Section::Certificate),
    ("CILINDRO", Section::Cylinders),
    ("TESTES", Section::Tests),
];

/// Uppercase and strip Portuguese diacritics so "INSPEÇÃO" == "INSPECAO"
pub fn normalize(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Try to read a line as a section heading.
///
/// Only single-segment lines qualify: "Número do Certificado | AZ25-002"
/// contains the CERTIFICADO keyword but is a label/value pair, not a heading.
pub fn match_heading(line: &str) -> Option<Section> {
    if line.contains(SEPARATOR) {
        return None;
    }
    let normalized = normalize(line.trim());
    HEADING_RULES
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, section)| *section)
}

/// Count distinct recognized headings in a line list (used by the sheet
/// selector to decide whether a sheet looks like an inspection grid)
pub fn count_headings(lines: &[String]) -> usize {
    let mut seen: Vec<Section> = Vec::new();
    for line in lines {
        if let Some(section) = match_heading(line) {
            if !seen.contains(&section) {
                seen.push(section);
            }
        }
    }
    seen.len()
}

// ============================================================================
// TAGGED LINE VARIANTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Line {
    /// A recognized section heading
    Heading { section: Section, raw: String },

    /// `label | value` pair (label sections only)
    LabelValue { label: String, value: String },

    /// Positional cells of a table section (header or data row)
    TableRow { cells: Vec<String> },

    /// Entirely blank row - terminates a table body
    Blank,
}

/// Classify one raw line within the context of the current section
fn classify(raw: &str, current: Section) -> Line {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }

    if let Some(section) = match_heading(trimmed) {
        return Line::Heading {
            section,
            raw: trimmed.to_string(),
        };
    }

    let cells: Vec<String> = trimmed
        .split(SEPARATOR)
        .map(|c| c.trim().to_string())
        .collect();

    // Preamble pairs classify as label/value too: headerless grids that put
    // "Número de Série | ..." before any heading still yield their fields
    if (current.is_label_section() || current == Section::Preamble) && cells.len() >= 2 {
        // First column = label, remainder joined = value
        Line::LabelValue {
            label: cells[0].clone(),
            value: cells[1..].join(SEPARATOR),
        }
    } else {
        Line::TableRow { cells }
    }
}

// ============================================================================
// SECTION BLOCKS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub section: Section,
    pub lines: Vec<Line>,
}

impl SectionBlock {
    fn new(section: Section) -> Self {
        SectionBlock {
            section,
            lines: Vec::new(),
        }
    }
}

/// Partition the ordered line list into contiguous section blocks.
///
/// Lines before the first recognized heading land in an implicit preamble
/// block. Unrecognized lines never start a new block - they belong to the
/// block that is currently open.
pub fn segment(lines: &[String]) -> Vec<SectionBlock> {
    let mut blocks: Vec<SectionBlock> = Vec::new();
    let mut current = SectionBlock::new(Section::Preamble);

    for raw in lines {
        match classify(raw, current.section) {
            Line::Heading { section, raw } => {
                if !current.lines.is_empty() || current.section != Section::Preamble {
                    blocks.push(current);
                }
                current = SectionBlock::new(section);
                current.lines.push(Line::Heading { section, raw });
            }
            other => current.lines.push(other),
        }
    }

    if !current.lines.is_empty() || current.section != Section::Preamble {
        blocks.push(current);
    }

    blocks
}

// ============================================================================
// TESTS
// ============================================================================
