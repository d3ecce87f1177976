// 💾 SQLite Repository - Durable store behind the repository port
// One connection, WAL mode, natural-key unique indexes. Dates are stored
// as ISO-8601 TEXT; enumerated values go through their as_str forms.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::assemble::{Certificate, Component, ComponentLocation, Cylinder, TestResult, Unit};
use crate::catalog::{Brand, Model};
use crate::fields::{Condition, CylinderKind};
use crate::repository::{InspectionEvent, InspectionRepository};

pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        setup_database(&conn)?;
        Ok(SqliteRepository { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteRepository { conn })
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS brands (
            id TEXT PRIMARY KEY,
            name TEXT UNIQUE COLLATE NOCASE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS models (
            id TEXT PRIMARY KEY,
            name TEXT COLLATE NOCASE NOT NULL,
            brand_id TEXT NOT NULL REFERENCES brands(id),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(brand_id, name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS units (
            serial_number TEXT PRIMARY KEY,
            brand_id TEXT REFERENCES brands(id),
            brand_name TEXT,
            model_id TEXT REFERENCES models(id),
            model_name TEXT,
            capacity INTEGER,
            manufacture_date TEXT,
            last_inspection_date TEXT,
            next_inspection_date TEXT,
            vessel_name TEXT,
            pack_type TEXT,
            status TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS certificates (
            number TEXT PRIMARY KEY,
            issue_date TEXT,
            next_inspection_date TEXT,
            unit_serial TEXT NOT NULL REFERENCES units(serial_number),
            technician TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS inspection_events (
            id TEXT PRIMARY KEY,
            unit_serial TEXT NOT NULL REFERENCES units(serial_number),
            inspected_at TEXT,
            fingerprint TEXT NOT NULL,
            source_file TEXT NOT NULL,
            imported_at TEXT NOT NULL,
            UNIQUE(unit_serial, inspected_at)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS components (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            inspection_id TEXT NOT NULL REFERENCES inspection_events(id),
            unit_serial TEXT NOT NULL,
            name TEXT NOT NULL,
            quantity INTEGER,
            condition TEXT NOT NULL,
            expiry_date TEXT,
            location TEXT NOT NULL,
            notes TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS cylinders (
            serial_number TEXT PRIMARY KEY,
            inspection_id TEXT NOT NULL REFERENCES inspection_events(id),
            kind TEXT,
            pressure_bar REAL,
            gas TEXT,
            expiry_date TEXT,
            next_test_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            inspection_id TEXT NOT NULL REFERENCES inspection_events(id),
            kind TEXT NOT NULL,
            test_date TEXT,
            result TEXT,
            pressure_bar REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_components_event ON components(inspection_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tests_event ON tests(inspection_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_unit ON inspection_events(unit_serial)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// TEXT <-> TYPED CONVERSIONS
// ============================================================================

fn date_to_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn date_from_sql(text: Option<String>) -> Option<NaiveDate> {
    text.and_then(|t| NaiveDate::parse_from_str(&t, "%Y-%m-%d").ok())
}

fn location_from_sql(text: &str) -> ComponentLocation {
    if text == "exterior" {
        ComponentLocation::Exterior
    } else {
        ComponentLocation::Interior
    }
}

// ============================================================================
// REPOSITORY PORT IMPLEMENTATION
// ============================================================================

impl InspectionRepository for SqliteRepository {
    fn load_brands(&self) -> Result<Vec<Brand>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM brands ORDER BY rowid")?;
        let brands = stmt
            .query_map([], |row| {
                Ok(Brand {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    pending: false,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(brands)
    }

    fn load_models(&self) -> Result<Vec<Model>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, brand_id FROM models ORDER BY rowid")?;
        let models = stmt
            .query_map([], |row| {
                Ok(Model {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    brand_id: row.get(2)?,
                    pending: false,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(models)
    }

    fn create_brand(&mut self, brand: &Brand) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO brands (id, name) VALUES (?1, ?2)",
            params![brand.id, brand.name],
        )?;
        Ok(())
    }

    fn create_model(&mut self, model: &Model) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO models (id, name, brand_id) VALUES (?1, ?2, ?3)",
            params![model.id, model.name, model.brand_id],
        )?;
        Ok(())
    }

    fn find_unit(&self, serial_number: &str) -> Result<Option<Unit>> {
        self.conn
            .query_row(
                "SELECT serial_number, brand_id, brand_name, model_id, model_name,
                        capacity, manufacture_date, last_inspection_date,
                        next_inspection_date, vessel_name, pack_type, status
                 FROM units WHERE serial_number = ?1",
                params![serial_number],
                |row| {
                    Ok(Unit {
                        serial_number: row.get(0)?,
                        brand_id: row.get(1)?,
                        brand_name: row.get(2)?,
                        model_id: row.get(3)?,
                        model_name: row.get(4)?,
                        capacity: row.get(5)?,
                        manufacture_date: date_from_sql(row.get(6)?),
                        last_inspection_date: date_from_sql(row.get(7)?),
                        next_inspection_date: date_from_sql(row.get(8)?),
                        vessel_name: row.get(9)?,
                        pack_type: row.get(10)?,
                        status: row.get(11)?,
                    })
                },
            )
            .optional()
            .context("Failed to read unit")
    }

    fn create_unit(&mut self, unit: &Unit) -> Result<()> {
        self.conn.execute(
            "INSERT INTO units (
                serial_number, brand_id, brand_name, model_id, model_name,
                capacity, manufacture_date, last_inspection_date,
                next_inspection_date, vessel_name, pack_type, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                unit.serial_number,
                unit.brand_id,
                unit.brand_name,
                unit.model_id,
                unit.model_name,
                unit.capacity,
                date_to_sql(unit.manufacture_date),
                date_to_sql(unit.last_inspection_date),
                date_to_sql(unit.next_inspection_date),
                unit.vessel_name,
                unit.pack_type,
                unit.status,
            ],
        )?;
        Ok(())
    }

    fn update_unit(&mut self, unit: &Unit) -> Result<()> {
        self.conn.execute(
            "UPDATE units SET
                brand_id = ?2, brand_name = ?3, model_id = ?4, model_name = ?5,
                capacity = ?6, manufacture_date = ?7, last_inspection_date = ?8,
                next_inspection_date = ?9, vessel_name = ?10, pack_type = ?11,
                status = ?12
             WHERE serial_number = ?1",
            params![
                unit.serial_number,
                unit.brand_id,
                unit.brand_name,
                unit.model_id,
                unit.model_name,
                unit.capacity,
                date_to_sql(unit.manufacture_date),
                date_to_sql(unit.last_inspection_date),
                date_to_sql(unit.next_inspection_date),
                unit.vessel_name,
                unit.pack_type,
                unit.status,
            ],
        )?;
        Ok(())
    }

    fn find_certificate(&self, number: &str) -> Result<Option<Certificate>> {
        self.conn
            .query_row(
                "SELECT number, issue_date, next_inspection_date, unit_serial, technician
                 FROM certificates WHERE number = ?1",
                params![number],
                |row| {
                    Ok(Certificate {
                        number: row.get(0)?,
                        issue_date: date_from_sql(row.get(1)?),
                        next_inspection_date: date_from_sql(row.get(2)?),
                        unit_serial: row.get(3)?,
                        technician: row.get(4)?,
                    })
                },
            )
            .optional()
            .context("Failed to read certificate")
    }

    fn create_certificate(&mut self, certificate: &Certificate) -> Result<()> {
        self.conn.execute(
            "INSERT INTO certificates (
                number, issue_date, next_inspection_date, unit_serial, technician
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                certificate.number,
                date_to_sql(certificate.issue_date),
                date_to_sql(certificate.next_inspection_date),
                certificate.unit_serial,
                certificate.technician,
            ],
        )?;
        Ok(())
    }

    fn update_certificate(&mut self, certificate: &Certificate) -> Result<()> {
        self.conn.execute(
            "UPDATE certificates SET
                issue_date = ?2, next_inspection_date = ?3, unit_serial = ?4,
                technician = ?5
             WHERE number = ?1",
            params![
                certificate.number,
                date_to_sql(certificate.issue_date),
                date_to_sql(certificate.next_inspection_date),
                certificate.unit_serial,
                certificate.technician,
            ],
        )?;
        Ok(())
    }

    fn find_event(
        &self,
        unit_serial: &str,
        inspected_at: Option<NaiveDate>,
    ) -> Result<Option<InspectionEvent>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, unit_serial, inspected_at, fingerprint, source_file, imported_at
                 FROM inspection_events
                 WHERE unit_serial = ?1 AND inspected_at IS ?2",
                params![unit_serial, date_to_sql(inspected_at)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, unit_serial, inspected_at, fingerprint, source_file, imported_at)) = row
        else {
            return Ok(None);
        };

        let imported_at = DateTime::parse_from_rfc3339(&imported_at)
            .context("Invalid imported_at timestamp")?
            .with_timezone(&Utc);

        Ok(Some(InspectionEvent {
            id,
            unit_serial,
            inspected_at: date_from_sql(inspected_at),
            fingerprint,
            source_file,
            imported_at,
        }))
    }

    fn create_event(&mut self, event: &InspectionEvent) -> Result<()> {
        self.conn.execute(
            "INSERT INTO inspection_events (
                id, unit_serial, inspected_at, fingerprint, source_file, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.id,
                event.unit_serial,
                date_to_sql(event.inspected_at),
                event.fingerprint,
                event.source_file,
                event.imported_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn update_event(&mut self, event: &InspectionEvent) -> Result<()> {
        self.conn.execute(
            "UPDATE inspection_events SET
                unit_serial = ?2, inspected_at = ?3, fingerprint = ?4,
                source_file = ?5, imported_at = ?6
             WHERE id = ?1",
            params![
                event.id,
                event.unit_serial,
                date_to_sql(event.inspected_at),
                event.fingerprint,
                event.source_file,
                event.imported_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn replace_components(&mut self, inspection_id: &str, components: &[Component]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM components WHERE inspection_id = ?1",
            params![inspection_id],
        )?;
        for component in components {
            tx.execute(
                "INSERT INTO components (
                    inspection_id, unit_serial, name, quantity, condition,
                    expiry_date, location, notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    component.inspection_id,
                    component.unit_serial,
                    component.name,
                    component.quantity,
                    component.condition.as_str(),
                    date_to_sql(component.expiry_date),
                    component.location.as_str(),
                    component.notes,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn replace_tests(&mut self, inspection_id: &str, tests: &[TestResult]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM tests WHERE inspection_id = ?1",
            params![inspection_id],
        )?;
        for test in tests {
            tx.execute(
                "INSERT INTO tests (inspection_id, kind, test_date, result, pressure_bar)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    test.inspection_id,
                    test.kind,
                    date_to_sql(test.test_date),
                    test.result,
                    test.pressure_bar,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn find_cylinder(&self, serial_number: &str) -> Result<Option<Cylinder>> {
        self.conn
            .query_row(
                "SELECT serial_number, inspection_id, kind, pressure_bar, gas,
                        expiry_date, next_test_date
                 FROM cylinders WHERE serial_number = ?1",
                params![serial_number],
                |row| {
                    let kind: Option<String> = row.get(2)?;
                    Ok(Cylinder {
                        serial_number: row.get(0)?,
                        inspection_id: row.get(1)?,
                        kind: kind.as_deref().and_then(CylinderKind::parse),
                        pressure_bar: row.get(3)?,
                        gas: row.get(4)?,
                        expiry_date: date_from_sql(row.get(5)?),
                        next_test_date: date_from_sql(row.get(6)?),
                    })
                },
            )
            .optional()
            .context("Failed to read cylinder")
    }

    fn create_cylinder(&mut self, cylinder: &Cylinder) -> Result<()> {
        self.conn.execute(
            "INSERT INTO cylinders (
                serial_number, inspection_id, kind, pressure_bar, gas,
                expiry_date, next_test_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                cylinder.serial_number,
                cylinder.inspection_id,
                cylinder.kind.map(|k| k.as_str()),
                cylinder.pressure_bar,
                cylinder.gas,
                date_to_sql(cylinder.expiry_date),
                date_to_sql(cylinder.next_test_date),
            ],
        )?;
        Ok(())
    }

    fn update_cylinder(&mut self, cylinder: &Cylinder) -> Result<()> {
        self.conn.execute(
            "UPDATE cylinders SET
                inspection_id = ?2, kind = ?3, pressure_bar = ?4, gas = ?5,
                expiry_date = ?6, next_test_date = ?7
             WHERE serial_number = ?1",
            params![
                cylinder.serial_number,
                cylinder.inspection_id,
                cylinder.kind.map(|k| k.as_str()),
                cylinder.pressure_bar,
                cylinder.gas,
                date_to_sql(cylinder.expiry_date),
                date_to_sql(cylinder.next_test_date),
            ],
        )?;
        Ok(())
    }
}

// ============================================================================
// READ-SIDE QUERIES (summary output)
// ============================================================================

impl SqliteRepository {
    pub fn count_units(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM units", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_events(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM inspection_events", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    pub fn components_of(&self, inspection_id: &str) -> Result<Vec<Component>> {
        let mut stmt = self.conn.prepare(
            "SELECT inspection_id, unit_serial, name, quantity, condition,
                    expiry_date, location, notes
             FROM components WHERE inspection_id = ?1 ORDER BY id",
        )?;
        let components = stmt
            .query_map(params![inspection_id], |row| {
                let condition: String = row.get(4)?;
                let location: String = row.get(6)?;
                Ok(Component {
                    inspection_id: row.get(0)?,
                    unit_serial: row.get(1)?,
                    name: row.get(2)?,
                    quantity: row.get(3)?,
                    condition: Condition::parse(&condition),
                    expiry_date: date_from_sql(row.get(5)?),
                    location: location_from_sql(&location),
                    notes: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(components)
    }
}

// ============================================================================
// TESTS
// ============================================================================
