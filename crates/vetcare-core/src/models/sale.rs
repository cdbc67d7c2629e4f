//! Sale models for the purchase history projection.
//!
//! Sales are written by the shop checkout flow, not by this core. Everything
//! here is a read-time projection with computed aggregates.

use serde::{Deserialize, Serialize};

/// Payment status of a sale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a stored value. Unrecognized values render as pending, matching
    /// how the storefront badge falls back.
    pub fn parse_or_pending(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }
}

/// One line of a sale, denormalized with the product identity for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name, joined at read time
    pub product_name: String,
    /// Product SKU, joined at read time
    pub product_sku: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// A completed transaction belonging to one customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub total: f64,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    /// Line items in stored order
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Number of distinct line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all line items.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Short order reference for display ("order #ab12cd34").
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}
