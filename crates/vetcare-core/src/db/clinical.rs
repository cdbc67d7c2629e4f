//! Clinical record and entry database operations.
//!
//! Entries have no update or delete path here, mirroring the append-only
//! triggers in the schema.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::{ClinicalEntry, ClinicalRecord, RecordView};

const ENTRY_COLUMNS: &str = "id, record_id, vet_id, reason, diagnosis, treatment, \
     prescriptions, weight, temperature, next_appointment, visit_date, created_at";

impl Database {
    /// Insert a new clinical record for a pet.
    pub fn insert_record(&self, record: &ClinicalRecord) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO clinical_records (id, pet_id, created_at) VALUES (?1, ?2, ?3)",
            params![record.id, record.pet_id, record.created_at],
        )?;
        Ok(())
    }

    /// Get a clinical record by ID.
    pub fn get_record(&self, id: &str) -> DbResult<Option<ClinicalRecord>> {
        self.conn
            .query_row(
                "SELECT id, pet_id, created_at FROM clinical_records WHERE id = ?",
                [id],
                |row| {
                    Ok(ClinicalRecord {
                        id: row.get(0)?,
                        pet_id: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Append a new entry row. Entries are immutable once written.
    pub fn insert_entry(&self, entry: &ClinicalEntry) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clinical_entries (
                id, record_id, vet_id, reason, diagnosis, treatment,
                prescriptions, weight, temperature, next_appointment,
                visit_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                entry.id,
                entry.record_id,
                entry.vet_id,
                entry.reason,
                entry.diagnosis,
                entry.treatment,
                entry.prescriptions,
                entry.weight,
                entry.temperature,
                entry.next_appointment,
                entry.visit_date,
                entry.created_at,
            ],
        )?;
        Ok(())
    }

    /// List a record's entries, most recent first for display. Insertion
    /// order (rowid) breaks timestamp ties, so the canonical stored order is
    /// never lost.
    pub fn list_entries(&self, record_id: &str) -> DbResult<Vec<ClinicalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM clinical_entries WHERE record_id = ? \
             ORDER BY visit_date DESC, rowid DESC",
            ENTRY_COLUMNS
        ))?;

        let rows = stmt.query_map([record_id], entry_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List all clinical records newest-first, each with the joined pet and
    /// owner identity and its entries.
    pub fn list_record_views(&self) -> DbResult<Vec<RecordView>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT r.id, r.pet_id, r.created_at, p.name, p.species, pr.full_name
            FROM clinical_records r
            JOIN pets p ON p.id = r.pet_id
            JOIN profiles pr ON pr.id = p.owner_id
            ORDER BY r.created_at DESC, r.rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                ClinicalRecord {
                    id: row.get(0)?,
                    pet_id: row.get(1)?,
                    created_at: row.get(2)?,
                },
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut views = Vec::new();
        for row in rows {
            let (record, pet_name, pet_species, owner_name) = row?;
            let entries = self.list_entries(&record.id)?;
            views.push(RecordView {
                record,
                pet_name,
                pet_species,
                owner_name,
                entries,
            });
        }
        Ok(views)
    }
}

fn entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClinicalEntry> {
    Ok(ClinicalEntry {
        id: row.get(0)?,
        record_id: row.get(1)?,
        vet_id: row.get(2)?,
        reason: row.get(3)?,
        diagnosis: row.get(4)?,
        treatment: row.get(5)?,
        prescriptions: row.get(6)?,
        weight: row.get(7)?,
        temperature: row.get(8)?,
        next_appointment: row.get(9)?,
        visit_date: row.get(10)?,
        created_at: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryForm, ValidatedEntry};

    fn setup_db() -> (Database, ClinicalRecord) {
        let db = Database::open_in_memory().unwrap();
        db.insert_profile("client-1", "Ana García").unwrap();
        db.insert_pet("pet-1", "client-1", "Max", "canine").unwrap();
        let record = ClinicalRecord::new("pet-1".into());
        db.insert_record(&record).unwrap();
        (db, record)
    }

    fn validated(reason: &str) -> ValidatedEntry {
        EntryForm {
            reason: reason.into(),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_insert_and_list_entries() {
        let (db, record) = setup_db();

        let entry = ClinicalEntry::new(record.id.clone(), "vet-1".into(), validated("checkup"));
        db.insert_entry(&entry).unwrap();

        let entries = db.list_entries(&record.id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], entry);
    }

    #[test]
    fn test_entries_listed_most_recent_first() {
        let (db, record) = setup_db();

        let first = ClinicalEntry::new(record.id.clone(), "vet-1".into(), validated("first"));
        let second = ClinicalEntry::new(record.id.clone(), "vet-1".into(), validated("second"));
        let third = ClinicalEntry::new(record.id.clone(), "vet-1".into(), validated("third"));
        db.insert_entry(&first).unwrap();
        db.insert_entry(&second).unwrap();
        db.insert_entry(&third).unwrap();

        let entries = db.list_entries(&record.id).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].reason, "third");
        assert_eq!(entries[1].reason, "second");
        assert_eq!(entries[2].reason, "first");
    }

    #[test]
    fn test_entry_requires_existing_record() {
        let (db, _) = setup_db();
        let entry = ClinicalEntry::new("missing-record".into(), "vet-1".into(), validated("x"));
        assert!(db.insert_entry(&entry).is_err());
    }

    #[test]
    fn test_record_views_join_pet_and_owner() {
        let (db, record) = setup_db();
        let entry = ClinicalEntry::new(record.id.clone(), "vet-1".into(), validated("checkup"));
        db.insert_entry(&entry).unwrap();

        let views = db.list_record_views().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].record.id, record.id);
        assert_eq!(views[0].pet_name, "Max");
        assert_eq!(views[0].pet_species, "canine");
        assert_eq!(views[0].owner_name, "Ana García");
        assert_eq!(views[0].entries.len(), 1);
    }
}
