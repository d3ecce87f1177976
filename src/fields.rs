// 🏷️ Field Extractor - Label rules, table zipping, locale-aware parsing
// Per section block: label sections match `label | value` pairs against a
// synonym table; table sections zip data rows against the header row.
//
// Every parser here is a TOTAL function: an unparsable cell is recorded as
// Absent plus a FieldParseWarning, never an error. Only structural failures
// are fatal, and those live elsewhere.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostics::Diagnostic;
use crate::segment::{normalize, Line, SectionBlock};

// ============================================================================
// TYPED VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Number(f64),
    Absent,
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Person counts and quantities arrive as numbers but are used as counts
    pub fn as_count(&self) -> Option<u32> {
        self.as_number()
            .filter(|n| *n >= 0.0)
            .map(|n| n.round() as u32)
    }
}

// ============================================================================
// FIELD KEYS + LABEL SYNONYM TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    SerialNumber,
    VesselName,
    BrandModel,
    Brand,
    Model,
    Capacity,
    ManufactureDate,
    PackType,
    CertificateNumber,
    InspectionDate,
    NextInspectionDate,
    Technician,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Date,
    Number,
}

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::SerialNumber => "serial_number",
            FieldKey::VesselName => "vessel_name",
            FieldKey::BrandModel => "brand_model",
            FieldKey::Brand => "brand",
            FieldKey::Model => "model",
            FieldKey::Capacity => "capacity",
            FieldKey::ManufactureDate => "manufacture_date",
            FieldKey::PackType => "pack_type",
            FieldKey::CertificateNumber => "certificate_number",
            FieldKey::InspectionDate => "inspection_date",
            FieldKey::NextInspectionDate => "next_inspection_date",
            FieldKey::Technician => "technician",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            FieldKey::Capacity => FieldKind::Number,
            FieldKey::ManufactureDate
            | FieldKey::InspectionDate
            | FieldKey::NextInspectionDate => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }
}

/// Label synonym table, matched by containment on the normalized label.
/// More specific patterns first ("MARCA/MODELO" before "MARCA").
const LABEL_RULES: &[(&str, FieldKey)] = &[
    ("NUMERO DE SERIE", FieldKey::SerialNumber),
    ("Nº DE SERIE", FieldKey::SerialNumber),
    ("SERIAL NUMBER", FieldKey::SerialNumber),
    ("MARCA/MODELO", FieldKey::BrandModel),
    ("MARCA / MODELO", FieldKey::BrandModel),
    ("MARCA", FieldKey::Brand),
    ("MODELO", FieldKey::Model),
    ("LOTACAO", FieldKey::Capacity),
    ("CAPACIDADE", FieldKey::Capacity),
    ("DATA DE FABRICO", FieldKey::ManufactureDate),
    ("DATA DE FABRICACAO", FieldKey::ManufactureDate),
    ("DATE OF MANUF", FieldKey::ManufactureDate),
    ("NAVIO", FieldKey::VesselName),
    ("EMBARCACAO", FieldKey::VesselName),
    ("TIPO DE PACK", FieldKey::PackType),
    ("PACK", FieldKey::PackType),
    ("NUMERO DO CERTIFICADO", FieldKey::CertificateNumber),
    ("CERTIFICADO Nº", FieldKey::CertificateNumber),
    ("CERTIFICADO N", FieldKey::CertificateNumber),
    ("DATA PROXIMA INSPECAO", FieldKey::NextInspectionDate),
    ("PROXIMA INSPECAO", FieldKey::NextInspectionDate),
    ("DATA DE INSPECAO", FieldKey::InspectionDate),
    ("DATA DA INSPECAO", FieldKey::InspectionDate),
    ("TECNICO", FieldKey::Technician),
];

fn match_label(label: &str) -> Option<FieldKey> {
    let normalized = normalize(label);
    LABEL_RULES
        .iter()
        .find(|(pattern, _)| normalized.contains(pattern))
        .map(|(_, key)| *key)
}

/// Extract typed fields from a label/value section block
pub fn extract_label_fields(
    block: &SectionBlock,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<FieldKey, FieldValue> {
    let mut fields = BTreeMap::new();

    for line in &block.lines {
        let Line::LabelValue { label, value } = line else {
            continue;
        };
        let Some(key) = match_label(label) else {
            continue; // unknown labels are tolerated, not flagged
        };

        let parsed = typed_value(key, value, diagnostics);
        // First occurrence wins; duplicated labels lower in the sheet lose
        fields.entry(key).or_insert(parsed);
    }

    fields
}

fn typed_value(key: FieldKey, raw: &str, diagnostics: &mut Vec<Diagnostic>) -> FieldValue {
    if is_blankish(raw) {
        return FieldValue::Absent;
    }
    match key.kind() {
        FieldKind::Text => FieldValue::Text(raw.trim().to_string()),
        FieldKind::Date => match parse_date(raw) {
            Some(d) => FieldValue::Date(d),
            None => {
                diagnostics.push(Diagnostic::parse_warning(key.as_str(), raw));
                FieldValue::Absent
            }
        },
        FieldKind::Number => match parse_number(raw) {
            Some(n) => FieldValue::Number(n),
            None => {
                diagnostics.push(Diagnostic::parse_warning(key.as_str(), raw));
                FieldValue::Absent
            }
        },
    }
}

// ============================================================================
// LOCALE-AWARE PARSERS
// ============================================================================

/// True for cells that are intentionally empty ("", "-", "---", "/")
fn is_blankish(raw: &str) -> bool {
    raw.trim().chars().all(|c| !c.is_alphanumeric())
}

/// Parse a date with day-month-year precedence (never month-day).
/// Accepted: DD-MM-YYYY, DD/MM/YYYY, ISO YYYY-MM-DD, and month-only
/// MM/YYYY or MM-YYYY (valid through the first of that month).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    for format in ["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // Month-only validity: "12/2026" → 2026-12-01
    let parts: Vec<&str> = trimmed.split(['/', '-']).collect();
    if parts.len() == 2 {
        if let (Ok(month), Ok(year)) = (parts[0].parse::<u32>(), parts[1].parse::<i32>()) {
            if (1..=12).contains(&month) && year >= 1000 {
                return NaiveDate::from_ymd_opt(year, month, 1);
            }
        }
    }

    None
}

/// Parse a number accepting both '.' and ',' as the decimal separator.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().replace(' ', "").replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// ============================================================================
// ENUMERATED CELL VALUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Ok,
    Replaced,
    Expired,
    Unknown,
}

impl Condition {
    pub fn parse(raw: &str) -> Condition {
        let normalized = normalize(raw);
        if normalized.contains("SUBSTITU")
            || normalized.contains("REPARAD")
            || normalized.contains("REPLACED")
        {
            Condition::Replaced
        } else if normalized.contains("EXPIRAD")
            || normalized.contains("CADUCAD")
            || normalized.contains("EXPIRED")
            || normalized.contains("FORA DE VALIDADE")
        {
            Condition::Expired
        } else if normalized.contains("OK") || normalized.contains("BOM") {
            Condition::Ok
        } else {
            Condition::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Ok => "ok",
            Condition::Replaced => "replaced",
            Condition::Expired => "expired",
            Condition::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CylinderKind {
    Co2,
    N2,
    Air,
}

impl CylinderKind {
    pub fn parse(raw: &str) -> Option<CylinderKind> {
        let normalized = normalize(raw);
        if normalized.contains("CO2") {
            Some(CylinderKind::Co2)
        } else if normalized.contains("N2")
            || normalized.contains("NITROG")
            || normalized.contains("AZOTO")
        {
            Some(CylinderKind::N2)
        } else if normalized == "AR" || normalized == "AIR" {
            Some(CylinderKind::Air)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CylinderKind::Co2 => "CO2",
            CylinderKind::N2 => "N2",
            CylinderKind::Air => "air",
        }
    }
}

// ============================================================================
// TABLE SECTIONS (header row + positional data rows)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRow {
    pub name: String,
    pub quantity: Option<u32>,
    pub condition: Condition,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderRow {
    pub serial_number: String,
    pub kind: Option<CylinderKind>,
    pub pressure_bar: Option<f64>,
    pub gas: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub next_test_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRow {
    pub kind: String,
    pub test_date: Option<NaiveDate>,
    pub result: Option<String>,
    pub pressure_bar: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Quantity,
    Condition,
    Expiry,
    Notes,
    Serial,
    Kind,
    Pressure,
    Gas,
    NextTest,
    Date,
    Result,
}

/// Header keyword tables, one per table family. Containment on the
/// normalized header cell; first match wins.
const COMPONENT_HEADERS: &[(&str, Column)] = &[
    ("NOME", Column::Name),
    ("COMPONENTE", Column::Name),
    ("DESCRICAO", Column::Name),
    ("QUANTIDADE", Column::Quantity),
    ("QTD", Column::Quantity),
    ("ESTADO", Column::Condition),
    ("CONDICAO", Column::Condition),
    ("VALIDADE", Column::Expiry),
    ("OBSERVACOES", Column::Notes),
    ("NOTAS", Column::Notes),
];

const CYLINDER_HEADERS: &[(&str, Column)] = &[
    ("SERIE", Column::Serial),
    ("IDENTIF", Column::Serial),
    ("NUMERO", Column::Serial),
    ("PROXIMO TESTE", Column::NextTest),
    ("TIPO", Column::Kind),
    ("PRESSAO", Column::Pressure),
    ("GAS", Column::Gas),
    ("VALIDADE", Column::Expiry),
];

const TEST_HEADERS: &[(&str, Column)] = &[
    ("TIPO", Column::Kind),
    ("RESULTADO", Column::Result),
    ("PRESSAO", Column::Pressure),
    ("DATA", Column::Date),
];

fn match_columns(header_cells: &[String], table: &[(&str, Column)]) -> Vec<Option<Column>> {
    header_cells
        .iter()
        .map(|cell| {
            let normalized = normalize(cell);
            table
                .iter()
                .find(|(pattern, _)| normalized.contains(pattern))
                .map(|(_, column)| *column)
        })
        .collect()
}

/// Walk a table block: the first TableRow is the header, every following
/// TableRow is zipped positionally against it until a blank line.
fn table_rows<'a>(block: &'a SectionBlock, table: &[(&str, Column)]) -> Vec<Vec<(Column, &'a str)>> {
    let mut columns: Option<Vec<Option<Column>>> = None;
    let mut rows = Vec::new();

    for line in &block.lines {
        match line {
            Line::TableRow { cells } => match &columns {
                None => columns = Some(match_columns(cells, table)),
                Some(cols) => {
                    let row: Vec<(Column, &str)> = cells
                        .iter()
                        .zip(cols.iter())
                        .filter_map(|(cell, col)| col.map(|c| (c, cell.as_str())))
                        .collect();
                    if !row.is_empty() {
                        rows.push(row);
                    }
                }
            },
            Line::Blank => {
                if columns.is_some() {
                    break;
                }
            }
            _ => {}
        }
    }

    rows
}

fn cell<'a>(row: &[(Column, &'a str)], wanted: Column) -> Option<&'a str> {
    row.iter()
        .find(|(col, _)| *col == wanted)
        .map(|(_, text)| *text)
        .filter(|text| !is_blankish(text))
}

fn cell_date(
    row: &[(Column, &str)],
    wanted: Column,
    field: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<NaiveDate> {
    let raw = cell(row, wanted)?;
    match parse_date(raw) {
        Some(d) => Some(d),
        None => {
            diagnostics.push(Diagnostic::parse_warning(field, raw));
            None
        }
    }
}

fn cell_number(
    row: &[(Column, &str)],
    wanted: Column,
    field: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<f64> {
    let raw = cell(row, wanted)?;
    match parse_number(raw) {
        Some(n) => Some(n),
        None => {
            diagnostics.push(Diagnostic::parse_warning(field, raw));
            None
        }
    }
}

/// Extract component rows (interior or exterior section)
pub fn extract_components(
    block: &SectionBlock,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ComponentRow> {
    table_rows(block, COMPONENT_HEADERS)
        .iter()
        .filter_map(|row| {
            let name = cell(row, Column::Name)?.to_string();
            Some(ComponentRow {
                name,
                quantity: cell_number(row, Column::Quantity, "component.quantity", diagnostics)
                    .filter(|n| *n >= 0.0)
                    .map(|n| n.round() as u32),
                condition: cell(row, Column::Condition)
                    .map(Condition::parse)
                    .unwrap_or(Condition::Unknown),
                expiry_date: cell_date(row, Column::Expiry, "component.expiry_date", diagnostics),
                notes: cell(row, Column::Notes).map(|s| s.to_string()),
            })
        })
        .collect()
}

/// Extract cylinder rows
pub fn extract_cylinders(
    block: &SectionBlock,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<CylinderRow> {
    table_rows(block, CYLINDER_HEADERS)
        .iter()
        .filter_map(|row| {
            let serial_number = cell(row, Column::Serial)?.to_string();
            Some(CylinderRow {
                serial_number,
                kind: cell(row, Column::Kind).and_then(CylinderKind::parse),
                pressure_bar: cell_number(row, Column::Pressure, "cylinder.pressure_bar", diagnostics),
                gas: cell(row, Column::Gas).map(|s| s.to_string()),
                expiry_date: cell_date(row, Column::Expiry, "cylinder.expiry_date", diagnostics),
                next_test_date: cell_date(
                    row,
                    Column::NextTest,
                    "cylinder.next_test_date",
                    diagnostics,
                ),
            })
        })
        .collect()
}

/// Extract performed-test rows (NAP / F3 / QI / LOAD)
pub fn extract_tests(block: &SectionBlock, diagnostics: &mut Vec<Diagnostic>) -> Vec<TestRow> {
    table_rows(block, TEST_HEADERS)
        .iter()
        .filter_map(|row| {
            let kind = cell(row, Column::Kind)?.to_string();
            Some(TestRow {
                kind,
                test_date: cell_date(row, Column::Date, "test.test_date", diagnostics),
                result: cell(row, Column::Result).map(|s| s.to_string()),
                pressure_bar: cell_number(row, Column::Pressure, "test.pressure_bar", diagnostics),
            })
        })
        .collect()
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

    #[test]
    fn test_parse_date_day_month_precedence() {
        // 07-01-2025 is January 7th, never July 1st
        assert_eq!(
            parse_date("07-01-2025"),
            NaiveDate::from_ymd_opt(2025, 1, 7)
        );
        assert_eq!(
            parse_date("12/12/2025"),
            NaiveDate::from_ymd_opt(2025, 12, 12)
        );
    }

    #[test]
    fn test_parse_date_month_only() {
        assert_eq!(parse_date("12/2026"), NaiveDate::from_ymd_opt(2026, 12, 1));
        assert_eq!(parse_date("06-2027"), NaiveDate::from_ymd_opt(2027, 6, 1));
        assert_eq!(parse_date("13/2026"), None);
        assert_eq!(parse_date("garbage"), None);
    }

    #[test]
    fn test_parse_number_both_separators() {
        assert_eq!(parse_number("57.25"), Some(57.25));
        assert_eq!(parse_number("57,25"), Some(57.25));
        assert_eq!(parse_number("8"), Some(8.0));
        assert_eq!(parse_number("oito"), None);
    }

    #[test]
    fn test_blankish_is_absent_not_zero() {
        assert!(is_blankish(""));
        assert!(is_blankish("  -  "));
        assert!(is_blankish("---"));
        assert!(!is_blankish("0"));
        assert!(!is_blankish("N/A"));
    }

    #[test]
    fn test_label_synonyms() {
        assert_eq!(match_label("Número de Série"), Some(FieldKey::SerialNumber));
        assert_eq!(match_label("MARCA/MODELO"), Some(FieldKey::BrandModel));
        assert_eq!(match_label("Marca"), Some(FieldKey::Brand));
        assert_eq!(match_label("Lotação"), Some(FieldKey::Capacity));
        assert_eq!(
            match_label("Data Próxima Inspeção"),
            Some(FieldKey::NextInspectionDate)
        );
        assert_eq!(
            match_label("Data de Inspeção"),
            Some(FieldKey::InspectionDate)
        );
        assert_eq!(match_label("Campo Desconhecido"), None);
    }

    #[test]
    fn test_extract_identification_fields() {
        let input = lines(&[
            "JANGADA:",
            "Número de Série | RFD12345",
            "Marca/Modelo | RFD SEASAVE PLUS R",
            "Lotação | 8",
            "Campo Estranho | valor",
        ]);
        let blocks = segment(&input);
        let mut diagnostics = Vec::new();
        let fields = extract_label_fields(&blocks[0], &mut diagnostics);

        assert_eq!(
            fields.get(&FieldKey::SerialNumber).and_then(|v| v.as_text()),
            Some("RFD12345")
        );
        assert_eq!(
            fields.get(&FieldKey::BrandModel).and_then(|v| v.as_text()),
            Some("RFD SEASAVE PLUS R")
        );
        assert_eq!(
            fields.get(&FieldKey::Capacity).and_then(|v| v.as_count()),
            Some(8)
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unparsable_cell_becomes_absent_with_warning() {
        let input = lines(&["JANGADA:", "Lotação | oito pessoas"]);
        let blocks = segment(&input);
        let mut diagnostics = Vec::new();
        let fields = extract_label_fields(&blocks[0], &mut diagnostics);

        assert_eq!(fields.get(&FieldKey::Capacity), Some(&FieldValue::Absent));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            crate::diagnostics::DiagnosticCode::FieldParseWarning
        );
    }

    #[test]
    fn test_extract_component_table() {
        let input = lines(&[
            "COMPONENTES INTERIORES",
            "Nome | Quantidade | Estado | Validade | Observações",
            "EPIRB | 1 | OK | 12/2026 | Funcionando",
            "Sinalizador Fumígeno | 4 | Substituído | 03/2025 | Válidos",
        ]);
        let blocks = segment(&input);
        let mut diagnostics = Vec::new();
        let rows = extract_components(&blocks[0], &mut diagnostics);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "EPIRB");
        assert_eq!(rows[0].quantity, Some(1));
        assert_eq!(rows[0].condition, Condition::Ok);
        assert_eq!(rows[0].expiry_date, NaiveDate::from_ymd_opt(2026, 12, 1));
        assert_eq!(rows[1].condition, Condition::Replaced);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_extract_cylinder_row_literal() {
        // Typical CO2 cylinder row as found on real quadros
        let input = lines(&[
            "CILINDROS CO2",
            "Nº de Série | Tipo | Pressão (bar) | Gás | Validade | Data Próximo Teste",
            "17W63103 | CO2 | 57.25 | CO2 | 12/2026 | 12-12-2025",
        ]);
        let blocks = segment(&input);
        let mut diagnostics = Vec::new();
        let rows = extract_cylinders(&blocks[0], &mut diagnostics);

        assert_eq!(rows.len(), 1);
        let cylinder = &rows[0];
        assert_eq!(cylinder.serial_number, "17W63103");
        assert_eq!(cylinder.kind, Some(CylinderKind::Co2));
        assert_eq!(cylinder.pressure_bar, Some(57.25));
        assert_eq!(cylinder.gas.as_deref(), Some("CO2"));
        assert_eq!(cylinder.expiry_date, NaiveDate::from_ymd_opt(2026, 12, 1));
        assert_eq!(
            cylinder.next_test_date,
            NaiveDate::from_ymd_opt(2025, 12, 12)
        );
    }

    #[test]
    fn test_extract_tests_table() {
        let input = lines(&[
            "TESTES REALIZADOS",
            "Tipo de Teste | Data | Resultado | Pressão (bar)",
            "NAP - TEST | 07-01-2025 | OK | 57.25",
            "F3 - TEST | 07-01-2025 | OK",
        ]);
        let blocks = segment(&input);
        let mut diagnostics = Vec::new();
        let rows = extract_tests(&blocks[0], &mut diagnostics);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, "NAP - TEST");
        assert_eq!(rows[0].pressure_bar, Some(57.25));
        assert_eq!(rows[1].result.as_deref(), Some("OK"));
        assert_eq!(rows[1].pressure_bar, None);
    }

    #[test]
    fn test_blank_row_terminates_table_body() {
        let input = lines(&[
            "COMPONENTES INTERIORES",
            "Nome | Quantidade | Estado | Validade",
            "EPIRB | 1 | OK | 12/2026",
            "",
            "Nota de rodapé | não é um componente",
        ]);
        let blocks = segment(&input);
        let mut diagnostics = Vec::new();
        let rows = extract_components(&blocks[0], &mut diagnostics);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "EPIRB");
    }

    #[test]
    fn test_condition_synonyms() {
        assert_eq!(Condition::parse("OK"), Condition::Ok);
        assert_eq!(Condition::parse("Substituído"), Condition::Replaced);
        assert_eq!(Condition::parse("Reparado"), Condition::Replaced);
        assert_eq!(Condition::parse("Caducado"), Condition::Expired);
        assert_eq!(Condition::parse("???"), Condition::Unknown);
    }

    #[test]
    fn test_cylinder_kind_synonyms() {
        assert_eq!(CylinderKind::parse("CO2"), Some(CylinderKind::Co2));
        assert_eq!(CylinderKind::parse("Nitrogénio"), Some(CylinderKind::N2));
        assert_eq!(CylinderKind::parse("Ar"), Some(CylinderKind::Air));
        assert_eq!(CylinderKind::parse("hélio"), None);
    }
}
