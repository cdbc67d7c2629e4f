//! SQLite schema definition.

/// Complete database schema for vetcare.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Directory (profiles, pets, products)
-- ============================================================================

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS pets (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES profiles(id),
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_pets_owner ON pets(owner_id);

CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    sku TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Appointments
-- ============================================================================

-- status carries no CHECK constraint: rows written by other clients may hold
-- values this build does not know, and they must remain readable.
CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL REFERENCES pets(id),
    client_id TEXT NOT NULL REFERENCES profiles(id),
    vet_id TEXT,                                 -- NULL until accepted
    type TEXT NOT NULL,                          -- consulta, teleconsulta, domicilio
    status TEXT NOT NULL DEFAULT 'pendiente',
    reason TEXT NOT NULL DEFAULT '',
    scheduled_for TEXT,                          -- NULL means "to be confirmed"
    teleconference_url TEXT,                     -- set at most once, teleconsulta only
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status);
CREATE INDEX IF NOT EXISTS idx_appointments_scheduled ON appointments(scheduled_for);
CREATE INDEX IF NOT EXISTS idx_appointments_pet ON appointments(pet_id);

-- ============================================================================
-- Clinical Records (Append-Only entries)
-- ============================================================================

CREATE TABLE IF NOT EXISTS clinical_records (
    id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL UNIQUE REFERENCES pets(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS clinical_entries (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL REFERENCES clinical_records(id),
    vet_id TEXT NOT NULL,
    reason TEXT NOT NULL,
    diagnosis TEXT,
    treatment TEXT,
    prescriptions TEXT,
    weight REAL,
    temperature REAL,
    next_appointment TEXT,
    visit_date TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Entries are immutable once written: no UPDATE or DELETE path exists in the
-- adapter, and these triggers make the store refuse one from anywhere else.
CREATE TRIGGER IF NOT EXISTS clinical_entries_no_update
BEFORE UPDATE ON clinical_entries
BEGIN
    SELECT RAISE(ABORT, 'clinical entries are append-only');
END;

CREATE TRIGGER IF NOT EXISTS clinical_entries_no_delete
BEFORE DELETE ON clinical_entries
BEGIN
    SELECT RAISE(ABORT, 'clinical entries are append-only');
END;

CREATE INDEX IF NOT EXISTS idx_entries_record ON clinical_entries(record_id);

-- ============================================================================
-- Sales (read-only projection source)
-- ============================================================================

CREATE TABLE IF NOT EXISTS sales (
    id TEXT PRIMARY KEY,
    customer_id TEXT NOT NULL REFERENCES profiles(id),
    total REAL NOT NULL DEFAULT 0,
    payment_status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_sales_customer ON sales(customer_id);

CREATE TABLE IF NOT EXISTS sale_items (
    id TEXT PRIMARY KEY,
    sale_id TEXT NOT NULL REFERENCES sales(id),
    product_id TEXT NOT NULL REFERENCES products(id),
    quantity INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    subtotal REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sale_items_sale ON sale_items(sale_id);
"#;
