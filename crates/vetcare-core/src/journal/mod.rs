//! Append-only clinical entry log.
//!
//! Entries are validated, stamped, and appended; they are never edited or
//! removed. A mistaken entry is corrected by appending a compensating one.

use crate::db::Database;
use crate::error::{ClinicError, ClinicResult};
use crate::events::{EventBus, QueryTag};
use crate::models::{ClinicalEntry, EntryForm, RecordView};

/// Outcome of a record PDF export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordExport {
    /// PDF generation is still in development.
    NotYetAvailable,
}

impl RecordExport {
    pub fn message(&self) -> &'static str {
        "record PDF download is still in development"
    }
}

/// Owns the append-only history entries linked to clinical records.
pub struct ClinicalJournal<'a> {
    db: &'a Database,
    events: &'a EventBus,
}

impl<'a> ClinicalJournal<'a> {
    pub fn new(db: &'a Database, events: &'a EventBus) -> Self {
        Self { db, events }
    }

    /// Validate and append a new entry to a record. The visit timestamp is
    /// assigned here, at append time.
    pub fn append_entry(
        &self,
        record_id: &str,
        vet_id: &str,
        form: EntryForm,
    ) -> ClinicResult<ClinicalEntry> {
        let validated = form.validate()?;
        self.require_record(record_id)?;

        let entry = ClinicalEntry::new(record_id.to_string(), vet_id.to_string(), validated);
        self.db.insert_entry(&entry)?;
        self.events.publish(QueryTag::ClinicalRecords);
        Ok(entry)
    }

    /// A record's entries, most recent first for display. The canonical
    /// stored order is insertion order; listing never reorders past rows.
    pub fn entries(&self, record_id: &str) -> ClinicResult<Vec<ClinicalEntry>> {
        self.require_record(record_id)?;
        Ok(self.db.list_entries(record_id)?)
    }

    /// All clinical records newest-first, with pet/owner identity and their
    /// entries. Pure read.
    pub fn records(&self) -> ClinicResult<Vec<RecordView>> {
        Ok(self.db.list_record_views()?)
    }

    /// Record PDF export placeholder. Checks the record resolves, then
    /// reports that generation is not available yet.
    pub fn record_pdf(&self, record_id: &str) -> ClinicResult<RecordExport> {
        self.require_record(record_id)?;
        Ok(RecordExport::NotYetAvailable)
    }

    fn require_record(&self, record_id: &str) -> ClinicResult<()> {
        if self.db.get_record(record_id)?.is_none() {
            return Err(ClinicError::NotFound {
                entity: "clinical record",
                id: record_id.to_string(),
            });
        }
        Ok(())
    }
}
