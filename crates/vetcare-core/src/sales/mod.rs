//! Purchase history viewer.
//!
//! Read-only projection over completed transactions; aggregates are
//! computed at read time and nothing here writes to the store.

use crate::db::Database;
use crate::error::{ClinicError, ClinicResult};
use crate::models::Sale;

/// Outcome of an invoice PDF request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceExport {
    /// Invoice generation is coming later; no document is produced.
    NotYetAvailable,
}

impl InvoiceExport {
    pub fn message(&self) -> &'static str {
        "invoice PDF generation is not yet available"
    }
}

/// Read-only projection over a customer's purchases.
pub struct PurchaseHistory<'a> {
    db: &'a Database,
}

impl<'a> PurchaseHistory<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// A customer's purchases newest-first, with denormalized line items
    /// and product names. Pure read.
    pub fn purchases(&self, customer_id: &str) -> ClinicResult<Vec<Sale>> {
        Ok(self.db.list_sales_for_customer(customer_id)?)
    }

    /// Invoice PDF placeholder: verifies the sale exists, then reports that
    /// generation is not available yet.
    pub fn invoice_pdf(&self, sale_id: &str) -> ClinicResult<InvoiceExport> {
        if !self.db.sale_exists(sale_id)? {
            return Err(ClinicError::NotFound {
                entity: "sale",
                id: sale_id.to_string(),
            });
        }
        Ok(InvoiceExport::NotYetAvailable)
    }
}
