//! Sales database operations.
//!
//! The core never writes sales in production; inserts exist for the checkout
//! flow that owns them and for tests. Reads denormalize the product identity
//! the way the storefront query did.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::{PaymentStatus, Sale, SaleItem};

impl Database {
    /// Insert a sale together with its line items.
    pub fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO sales (id, customer_id, total, payment_status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                sale.id,
                sale.customer_id,
                sale.total,
                sale.payment_status.as_str(),
                sale.created_at,
            ],
        )?;

        for item in &sale.items {
            self.conn.execute(
                r#"
                INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price, subtotal)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    item.id,
                    sale.id,
                    item.product_id,
                    item.quantity,
                    item.unit_price,
                    item.subtotal,
                ],
            )?;
        }
        Ok(())
    }

    /// Whether a sale row exists.
    pub fn sale_exists(&self, id: &str) -> DbResult<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sales WHERE id = ?)",
                [id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// List a customer's sales newest-first, each with its line items and
    /// the joined product name/SKU.
    pub fn list_sales_for_customer(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, customer_id, total, payment_status, created_at
            FROM sales
            WHERE customer_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([customer_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut sales = Vec::new();
        for row in rows {
            let (id, customer_id, total, status_raw, created_at) = row?;
            let items = self.list_sale_items(&id)?;
            sales.push(Sale {
                id,
                customer_id,
                total,
                payment_status: PaymentStatus::parse_or_pending(&status_raw),
                created_at,
                items,
            });
        }
        Ok(sales)
    }

    fn list_sale_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i.id, i.sale_id, i.product_id, p.name, p.sku,
                   i.quantity, i.unit_price, i.subtotal
            FROM sale_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.sale_id = ?
            ORDER BY i.rowid
            "#,
        )?;

        let rows = stmt.query_map([sale_id], |row| {
            Ok(SaleItem {
                id: row.get(0)?,
                sale_id: row.get(1)?,
                product_id: row.get(2)?,
                product_name: row.get(3)?,
                product_sku: row.get(4)?,
                quantity: row.get(5)?,
                unit_price: row.get(6)?,
                subtotal: row.get(7)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
