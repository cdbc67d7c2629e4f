//! Reference rows the listings join against: profiles, pets, products.
//!
//! These collections are owned by other flows (registration, inventory);
//! the adapter only needs inserts for seeding and the joined reads used by
//! the list operations.

use rusqlite::params;

use super::{Database, DbResult};

impl Database {
    /// Insert a client or vet profile.
    pub fn insert_profile(&self, id: &str, full_name: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO profiles (id, full_name) VALUES (?1, ?2)",
            params![id, full_name],
        )?;
        Ok(())
    }

    /// Insert a pet belonging to a profile.
    pub fn insert_pet(&self, id: &str, owner_id: &str, name: &str, species: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO pets (id, owner_id, name, species) VALUES (?1, ?2, ?3, ?4)",
            params![id, owner_id, name, species],
        )?;
        Ok(())
    }

    /// Insert a shop product.
    pub fn insert_product(&self, id: &str, sku: &str, name: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO products (id, sku, name) VALUES (?1, ?2, ?3)",
            params![id, sku, name],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_directory_rows() {
        let db = Database::open_in_memory().unwrap();

        db.insert_profile("c1", "Ana García").unwrap();
        db.insert_pet("p1", "c1", "Max", "canine").unwrap();
        db.insert_product("prod1", "SH-001", "Flea shampoo").unwrap();

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM pets WHERE owner_id = 'c1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_pet_requires_owner() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_pet("p1", "missing-owner", "Max", "canine");
        assert!(result.is_err());
    }
}
