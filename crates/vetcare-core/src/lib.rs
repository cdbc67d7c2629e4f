//! VetCare Core Library
//!
//! Logic layer of a veterinary-clinic management client: appointment
//! lifecycle, append-only clinical history, teleconference link
//! provisioning, and a read-only purchase history projection.
//!
//! # Appointment lifecycle
//!
//! ```text
//!                    accept(vet)              complete
//!      requested ──────────────► confirmed ──────────► completed
//!          │                         │
//!          │ cancel                  │ cancel
//!          ▼                         ▼
//!      cancelled ◄───────────────────┘
//! ```
//!
//! `completed` and `cancelled` are terminal. Every transition is a
//! conditional write guarded on the current status; when a concurrent
//! client wins the race, the caller sees an explicit error instead of a
//! silent overwrite.
//!
//! # Modules
//!
//! - [`db`]: SQLite store adapter
//! - [`models`]: Domain types (Appointment, ClinicalEntry, Sale, etc.)
//! - [`scheduling`]: Lifecycle state machine + teleconference provisioner
//! - [`journal`]: Append-only clinical entry log
//! - [`sales`]: Purchase history projection
//! - [`events`]: Cache-invalidation events consumed by the view layer

pub mod db;
pub mod error;
pub mod events;
pub mod journal;
pub mod models;
pub mod sales;
pub mod scheduling;

// Re-export commonly used types
pub use db::{Database, GuardedWrite};
pub use error::{ClinicError, ClinicResult};
pub use events::{EventBus, QueryTag};
pub use journal::{ClinicalJournal, RecordExport};
pub use models::{
    Appointment, AppointmentStatus, AppointmentType, AppointmentView, ClinicalEntry,
    ClinicalRecord, EntryForm, PaymentStatus, RecordView, Sale, SaleItem, StoredStatus,
    ValidatedEntry,
};
pub use sales::{InvoiceExport, PurchaseHistory};
pub use scheduling::{teleconference_url, AppointmentManager, TeleconferenceProvisioner};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetCareError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ClinicError> for VetCareError {
    fn from(e: ClinicError) -> Self {
        match e {
            ClinicError::NotFound { .. } => VetCareError::NotFound(e.to_string()),
            ClinicError::InvalidTransition { .. } => VetCareError::InvalidTransition(e.to_string()),
            ClinicError::InvalidState { .. } => VetCareError::InvalidState(e.to_string()),
            ClinicError::Validation { field, reason } => VetCareError::Validation {
                field: field.to_string(),
                message: reason,
            },
            ClinicError::Store(inner) => VetCareError::StoreError(inner.to_string()),
        }
    }
}

impl From<db::DbError> for VetCareError {
    fn from(e: db::DbError) -> Self {
        VetCareError::StoreError(e.to_string())
    }
}

impl From<serde_json::Error> for VetCareError {
    fn from(e: serde_json::Error) -> Self {
        VetCareError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetCareError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetCareError::StoreError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<VetCareCore>, VetCareError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(VetCareCore::with_database(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<VetCareCore>, VetCareError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(VetCareCore::with_database(db)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe core wrapper exposed to the UI shell.
#[derive(uniffi::Object)]
pub struct VetCareCore {
    db: Arc<Mutex<Database>>,
    session: Mutex<Option<String>>,
    invalidations: Mutex<Vec<QueryTag>>,
}

impl VetCareCore {
    fn with_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            session: Mutex::new(None),
            invalidations: Mutex::new(Vec::new()),
        }
    }

    /// The signed-in user, required for operations that record authorship.
    fn current_user(&self) -> Result<String, VetCareError> {
        self.session
            .lock()?
            .clone()
            .ok_or_else(|| VetCareError::InvalidState("no active session".into()))
    }

    fn absorb_events(&self, bus: &EventBus) -> Result<(), VetCareError> {
        self.invalidations.lock()?.extend(bus.drain());
        Ok(())
    }

    /// Run a closure against the underlying store. Not exported over FFI;
    /// used by host-side tooling and integration tests for seeding.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> Result<T, db::DbError>,
    ) -> Result<T, VetCareError> {
        let db = self.db.lock()?;
        f(&db).map_err(Into::into)
    }
}

#[uniffi::export]
impl VetCareCore {
    // =========================================================================
    // Session
    // =========================================================================

    /// Record the authenticated user resolved by the external auth provider.
    pub fn sign_in(&self, user_id: String) -> Result<(), VetCareError> {
        *self.session.lock()? = Some(user_id);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), VetCareError> {
        *self.session.lock()? = None;
        Ok(())
    }

    pub fn current_user_id(&self) -> Result<Option<String>, VetCareError> {
        Ok(self.session.lock()?.clone())
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// Open appointments (requested or confirmed), ascending by scheduled
    /// time, with an optional earliest-date filter.
    pub fn list_appointments(
        &self,
        since: Option<String>,
    ) -> Result<Vec<FfiAppointmentView>, VetCareError> {
        let db = self.db.lock()?;
        let events = EventBus::new();
        let manager = AppointmentManager::new(&db, &events);
        let views = manager.list_open(since.as_deref())?;
        Ok(views.into_iter().map(|v| v.into()).collect())
    }

    /// Accept a requested appointment as the signed-in vet.
    pub fn accept_appointment(
        &self,
        appointment_id: String,
    ) -> Result<FfiAppointment, VetCareError> {
        let vet_id = self.current_user()?;
        let db = self.db.lock()?;
        let events = EventBus::new();
        let manager = AppointmentManager::new(&db, &events);
        let appointment = manager.accept(&appointment_id, &vet_id)?;
        self.absorb_events(&events)?;
        Ok(appointment.into())
    }

    /// Cancel a requested or confirmed appointment.
    pub fn cancel_appointment(
        &self,
        appointment_id: String,
    ) -> Result<FfiAppointment, VetCareError> {
        let db = self.db.lock()?;
        let events = EventBus::new();
        let manager = AppointmentManager::new(&db, &events);
        let appointment = manager.cancel(&appointment_id)?;
        self.absorb_events(&events)?;
        Ok(appointment.into())
    }

    /// Complete a confirmed appointment. The UI is expected to offer
    /// creating a clinical entry afterwards.
    pub fn complete_appointment(
        &self,
        appointment_id: String,
    ) -> Result<FfiAppointment, VetCareError> {
        let db = self.db.lock()?;
        let events = EventBus::new();
        let manager = AppointmentManager::new(&db, &events);
        let appointment = manager.complete(&appointment_id)?;
        self.absorb_events(&events)?;
        Ok(appointment.into())
    }

    /// Get or provision the session URL of a confirmed teleconsult.
    pub fn ensure_teleconference_link(
        &self,
        appointment_id: String,
    ) -> Result<String, VetCareError> {
        let db = self.db.lock()?;
        let events = EventBus::new();
        let provisioner = TeleconferenceProvisioner::new(&db, &events);
        let url = provisioner.ensure_link(&appointment_id)?;
        self.absorb_events(&events)?;
        Ok(url)
    }

    // =========================================================================
    // Clinical Record Operations
    // =========================================================================

    /// Append a clinical entry authored by the signed-in vet.
    pub fn append_clinical_entry(
        &self,
        record_id: String,
        form: FfiEntryForm,
    ) -> Result<FfiClinicalEntry, VetCareError> {
        let vet_id = self.current_user()?;
        let db = self.db.lock()?;
        let events = EventBus::new();
        let journal = ClinicalJournal::new(&db, &events);
        let entry = journal.append_entry(&record_id, &vet_id, form.into())?;
        self.absorb_events(&events)?;
        Ok(entry.into())
    }

    /// A record's entries, most recent first.
    pub fn list_clinical_entries(
        &self,
        record_id: String,
    ) -> Result<Vec<FfiClinicalEntry>, VetCareError> {
        let db = self.db.lock()?;
        let events = EventBus::new();
        let journal = ClinicalJournal::new(&db, &events);
        let entries = journal.entries(&record_id)?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    /// All clinical records newest-first with their entries.
    pub fn list_clinical_records(&self) -> Result<Vec<FfiRecordView>, VetCareError> {
        let db = self.db.lock()?;
        let events = EventBus::new();
        let journal = ClinicalJournal::new(&db, &events);
        let records = journal.records()?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Record PDF placeholder; returns the user-facing status message.
    pub fn download_record_pdf(&self, record_id: String) -> Result<String, VetCareError> {
        let db = self.db.lock()?;
        let events = EventBus::new();
        let journal = ClinicalJournal::new(&db, &events);
        let export = journal.record_pdf(&record_id)?;
        Ok(export.message().to_string())
    }

    // =========================================================================
    // Purchase History Operations
    // =========================================================================

    /// A customer's purchases newest-first with computed aggregates.
    pub fn list_purchases(&self, customer_id: String) -> Result<Vec<FfiPurchase>, VetCareError> {
        let db = self.db.lock()?;
        let viewer = PurchaseHistory::new(&db);
        let sales = viewer.purchases(&customer_id)?;
        Ok(sales.into_iter().map(|s| s.into()).collect())
    }

    /// Export a customer's purchase history as JSON.
    pub fn export_purchases_json(&self, customer_id: String) -> Result<String, VetCareError> {
        let db = self.db.lock()?;
        let viewer = PurchaseHistory::new(&db);
        let sales = viewer.purchases(&customer_id)?;
        Ok(serde_json::to_string(&sales)?)
    }

    /// Invoice PDF placeholder; returns the user-facing status message.
    pub fn download_invoice_pdf(&self, sale_id: String) -> Result<String, VetCareError> {
        let db = self.db.lock()?;
        let viewer = PurchaseHistory::new(&db);
        let export = viewer.invoice_pdf(&sale_id)?;
        Ok(export.message().to_string())
    }

    // =========================================================================
    // Cache Invalidation
    // =========================================================================

    /// Take the query tags staled by mutations since the last drain. The
    /// view layer refetches those queries.
    pub fn drain_invalidations(&self) -> Result<Vec<QueryTag>, VetCareError> {
        Ok(self.invalidations.lock()?.drain(..).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub pet_id: String,
    pub client_id: String,
    pub vet_id: Option<String>,
    pub kind: String,
    /// Raw status as stored
    pub status: String,
    /// Status for display; unrecognized values render as requested
    pub display_status: String,
    pub reason: String,
    pub scheduled_for: Option<String>,
    /// Scheduled time or the "to be confirmed" label
    pub scheduled_display: String,
    pub teleconference_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            kind: appointment.kind.as_str().to_string(),
            status: appointment.status.raw().to_string(),
            display_status: appointment.status.display_status().as_str().to_string(),
            scheduled_display: appointment.scheduled_display().to_string(),
            id: appointment.id,
            pet_id: appointment.pet_id,
            client_id: appointment.client_id,
            vet_id: appointment.vet_id,
            reason: appointment.reason,
            scheduled_for: appointment.scheduled_for,
            teleconference_url: appointment.teleconference_url,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

/// FFI-safe appointment listing row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentView {
    pub appointment: FfiAppointment,
    pub pet_name: String,
    pub pet_species: String,
    pub client_name: String,
}

impl From<AppointmentView> for FfiAppointmentView {
    fn from(view: AppointmentView) -> Self {
        Self {
            appointment: view.appointment.into(),
            pet_name: view.pet_name,
            pet_species: view.pet_species,
            client_name: view.client_name,
        }
    }
}

/// FFI-safe clinical entry form. Empty strings mean absent.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEntryForm {
    pub reason: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescriptions: String,
    pub weight: String,
    pub temperature: String,
    pub next_appointment: String,
}

impl From<FfiEntryForm> for EntryForm {
    fn from(form: FfiEntryForm) -> Self {
        EntryForm {
            reason: form.reason,
            diagnosis: form.diagnosis,
            treatment: form.treatment,
            prescriptions: form.prescriptions,
            weight: form.weight,
            temperature: form.temperature,
            next_appointment: form.next_appointment,
        }
    }
}

/// FFI-safe clinical entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicalEntry {
    pub id: String,
    pub record_id: String,
    pub vet_id: String,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub prescriptions: Option<String>,
    pub weight: Option<f64>,
    pub temperature: Option<f64>,
    pub next_appointment: Option<String>,
    pub visit_date: String,
}

impl From<ClinicalEntry> for FfiClinicalEntry {
    fn from(entry: ClinicalEntry) -> Self {
        Self {
            id: entry.id,
            record_id: entry.record_id,
            vet_id: entry.vet_id,
            reason: entry.reason,
            diagnosis: entry.diagnosis,
            treatment: entry.treatment,
            prescriptions: entry.prescriptions,
            weight: entry.weight,
            temperature: entry.temperature,
            next_appointment: entry.next_appointment,
            visit_date: entry.visit_date,
        }
    }
}

/// FFI-safe clinical record listing row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecordView {
    pub record_id: String,
    pub pet_id: String,
    pub pet_name: String,
    pub pet_species: String,
    pub owner_name: String,
    pub created_at: String,
    pub entries: Vec<FfiClinicalEntry>,
}

impl From<RecordView> for FfiRecordView {
    fn from(view: RecordView) -> Self {
        Self {
            record_id: view.record.id,
            pet_id: view.record.pet_id,
            pet_name: view.pet_name,
            pet_species: view.pet_species,
            owner_name: view.owner_name,
            created_at: view.record.created_at,
            entries: view.entries.into_iter().map(|e| e.into()).collect(),
        }
    }
}

/// FFI-safe purchase with read-time aggregates.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPurchase {
    pub id: String,
    /// Short order reference for display
    pub short_id: String,
    pub customer_id: String,
    pub total: f64,
    pub payment_status: String,
    pub created_at: String,
    pub item_count: u32,
    pub unit_count: i64,
    pub items: Vec<FfiPurchaseItem>,
}

impl From<Sale> for FfiPurchase {
    fn from(sale: Sale) -> Self {
        Self {
            short_id: sale.short_id().to_string(),
            item_count: sale.item_count() as u32,
            unit_count: sale.unit_count(),
            payment_status: sale.payment_status.as_str().to_string(),
            id: sale.id,
            customer_id: sale.customer_id,
            total: sale.total,
            created_at: sale.created_at,
            items: sale.items.into_iter().map(|i| i.into()).collect(),
        }
    }
}

/// FFI-safe purchase line item.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPurchaseItem {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

impl From<SaleItem> for FfiPurchaseItem {
    fn from(item: SaleItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            product_sku: item.product_sku,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
        }
    }
}
