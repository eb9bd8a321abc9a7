//! SQL schema for the construction tracking tables.
//!
//! # Table structure
//!
//! - `projects` — project metadata, budget, and status
//! - `phases` — project stages with planned duration
//! - `milestones` — dated checkpoints, stamped on completion
//! - `suppliers` — vendors
//! - `materials` — purchasable inputs with an optional default supplier
//! - `inventory` — one stock row per material
//! - `orders` — purchase requests against a material and supplier
//!
//! Creation is additive only: `CREATE TABLE IF NOT EXISTS` never alters an
//! existing table.

/// Tables in dependency order, used for status reporting.
pub(crate) const TABLES: [&str; 7] = [
    "projects",
    "phases",
    "milestones",
    "suppliers",
    "materials",
    "inventory",
    "orders",
];

/// Generates the complete SQL schema for all tables and indexes.
pub fn generate_schema_sql() -> &'static str {
    r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    location TEXT,
    budget REAL CHECK (budget IS NULL OR budget >= 0),
    start_date TEXT,
    end_date TEXT,
    status TEXT NOT NULL DEFAULT 'active'
);

CREATE TABLE IF NOT EXISTS phases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    duration INTEGER CHECK (duration IS NULL OR duration >= 0),
    start_date TEXT,
    status TEXT NOT NULL DEFAULT 'planned',
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS milestones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    target_date TEXT,
    completion_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS suppliers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    contact TEXT
);

CREATE TABLE IF NOT EXISTS materials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    unit TEXT NOT NULL,
    cost_per_unit REAL CHECK (cost_per_unit IS NULL OR cost_per_unit >= 0),
    supplier_id INTEGER,
    FOREIGN KEY (supplier_id) REFERENCES suppliers(id)
);

CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    material_id INTEGER NOT NULL UNIQUE,
    quantity REAL NOT NULL DEFAULT 0,
    location TEXT NOT NULL DEFAULT 'warehouse',
    FOREIGN KEY (material_id) REFERENCES materials(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    material_id INTEGER NOT NULL,
    supplier_id INTEGER NOT NULL,
    quantity REAL NOT NULL CHECK (quantity > 0),
    order_date TEXT NOT NULL,
    delivery_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    FOREIGN KEY (material_id) REFERENCES materials(id),
    FOREIGN KEY (supplier_id) REFERENCES suppliers(id)
);

CREATE INDEX IF NOT EXISTS idx_phases_project ON phases(project_id);
CREATE INDEX IF NOT EXISTS idx_milestones_project ON milestones(project_id);
CREATE INDEX IF NOT EXISTS idx_suppliers_name ON suppliers(name);
CREATE INDEX IF NOT EXISTS idx_materials_supplier ON materials(supplier_id);
CREATE INDEX IF NOT EXISTS idx_orders_material ON orders(material_id);
CREATE INDEX IF NOT EXISTS idx_orders_supplier ON orders(supplier_id);
"#
}
