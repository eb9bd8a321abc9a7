//! Material, supplier, inventory, and order operations.
//!
//! Supplier resolution for orders follows a fixed precedence: an explicit
//! supplier id wins, otherwise the material's default supplier is used, and
//! if neither exists the order is refused with
//! [`StoreError::UnresolvedSupplier`]. All references are checked before the
//! row is inserted, so a refused operation writes nothing.
//!
//! # Example
//!
//! ```no_run
//! use construction_core::{NewMaterial, NewOrder};
//! use construction_sqlite::{MaterialService, Store};
//!
//! let store = Store::open("construction.db").unwrap();
//! store.init().unwrap();
//!
//! let materials = MaterialService::new(&store);
//! let cement = materials
//!     .add_material(&NewMaterial::new("Cement", "bag").with_cost(5.5).with_supplier("AcmeCo"))
//!     .unwrap();
//! let order = materials.create_order(&NewOrder::new(cement.id, 20.0)).unwrap();
//! assert_eq!(order.supplier.name, "AcmeCo");
//! ```

use chrono::NaiveDate;
use construction_core::{
    DEFAULT_STOCK_LOCATION, Inventory, InventoryEntry, Material, NewMaterial, NewOrder,
    ORDER_STATUS_PENDING, Order, OrderDetail, RecordId, Supplier, ValidationError, require_text,
};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::convert::{
    INVENTORY_COLUMNS, MATERIAL_COLUMNS, SUPPLIER_COLUMNS, clean_text, inventory_entry_from_row,
    load_material, load_order_detail, load_supplier, material_at, order_detail_from_row,
    order_detail_select, supplier_at, today,
};
use crate::error::{Result, StoreError};
use crate::store::Store;

/// Operations on materials, suppliers, stock, and orders.
pub struct MaterialService<'a> {
    store: &'a Store,
}

impl<'a> MaterialService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Registers a material, linking it to a supplier by exact name.
    ///
    /// The supplier is created when no supplier with that name exists yet.
    /// Lookup and creation happen in the same session as the material
    /// insert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a blank name or unit, or a
    /// negative unit cost.
    pub fn add_material(&self, input: &NewMaterial) -> Result<Material> {
        let name = require_text("material name", &input.name)?;
        let unit = require_text("unit", &input.unit)?;
        if let Some(cost) = input.cost_per_unit.filter(|c| *c < 0.0) {
            return Err(ValidationError::Negative(cost.to_string()).into());
        }

        let session = self.store.session()?;
        let supplier_id = match clean_text(input.supplier_name.as_deref()) {
            Some(supplier_name) => Some(find_or_create_supplier(&session, &supplier_name)?),
            None => None,
        };
        session.execute(
            "INSERT INTO materials (name, unit, cost_per_unit, supplier_id) \
             VALUES (?1, ?2, ?3, ?4)",
            params![name, unit, input.cost_per_unit, supplier_id],
        )?;
        let id = session.last_insert_rowid();
        session.commit()?;
        debug!(id, name = %name, ?supplier_id, "added material");

        Ok(Material {
            id,
            name,
            unit,
            cost_per_unit: input.cost_per_unit,
            supplier_id,
        })
    }

    /// Lists materials in insertion order.
    pub fn list_materials(&self) -> Result<Vec<Material>> {
        let session = self.store.session()?;
        let mut stmt = session.prepare(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials m ORDER BY m.id"
        ))?;
        let materials = stmt
            .query_map([], |row| material_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(materials)
    }

    /// Loads a single material by id.
    pub fn get_material(&self, id: RecordId) -> Result<Option<Material>> {
        let session = self.store.session()?;
        load_material(&session, id)
    }

    /// Creates a supplier.
    ///
    /// Names are not unique; adding an existing name creates a second row.
    pub fn add_supplier(&self, name: &str, contact: Option<&str>) -> Result<Supplier> {
        let name = require_text("supplier name", name)?;
        let contact = clean_text(contact);

        let session = self.store.session()?;
        session.execute(
            "INSERT INTO suppliers (name, contact) VALUES (?1, ?2)",
            params![name, contact],
        )?;
        let id = session.last_insert_rowid();
        session.commit()?;
        debug!(id, name = %name, "added supplier");

        Ok(Supplier { id, name, contact })
    }

    /// Lists suppliers in insertion order.
    pub fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        let session = self.store.session()?;
        let mut stmt = session.prepare(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers s ORDER BY s.id"
        ))?;
        let suppliers = stmt
            .query_map([], |row| supplier_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(suppliers)
    }

    /// Loads a single supplier by id.
    pub fn get_supplier(&self, id: RecordId) -> Result<Option<Supplier>> {
        let session = self.store.session()?;
        load_supplier(&session, id)
    }

    /// Lists every material with its inventory row.
    ///
    /// With a threshold, only materials that have an inventory row with
    /// `quantity <= threshold` are returned; a material that was never
    /// stocked is not considered low on stock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a negative or non-finite
    /// threshold.
    pub fn get_inventory(&self, low_stock_threshold: Option<f64>) -> Result<Vec<InventoryEntry>> {
        match low_stock_threshold {
            Some(t) if !t.is_finite() => {
                return Err(ValidationError::InvalidNumber(t.to_string()).into());
            }
            Some(t) if t < 0.0 => return Err(ValidationError::Negative(t.to_string()).into()),
            _ => {}
        }

        let session = self.store.session()?;
        let mut stmt = session.prepare(&format!(
            "SELECT {MATERIAL_COLUMNS}, {INVENTORY_COLUMNS} FROM materials m \
             LEFT JOIN inventory i ON i.material_id = m.id \
             WHERE ?1 IS NULL OR (i.id IS NOT NULL AND i.quantity <= ?1) \
             ORDER BY m.id"
        ))?;
        let entries = stmt
            .query_map(params![low_stock_threshold], inventory_entry_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Sets a material's stock level and location.
    ///
    /// Creates the inventory row on first use and overwrites it afterwards,
    /// so a material never has more than one. `location` defaults to
    /// `warehouse`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the material does not exist, or
    /// [`StoreError::Validation`] for a negative quantity.
    pub fn update_stock(
        &self,
        material_id: RecordId,
        quantity: f64,
        location: Option<&str>,
    ) -> Result<Inventory> {
        if quantity < 0.0 {
            return Err(ValidationError::Negative(quantity.to_string()).into());
        }
        let location = clean_text(location).unwrap_or_else(|| DEFAULT_STOCK_LOCATION.to_string());

        let session = self.store.session()?;
        if load_material(&session, material_id)?.is_none() {
            return Err(StoreError::not_found("Material", material_id));
        }
        session.execute(
            "INSERT INTO inventory (material_id, quantity, location) VALUES (?1, ?2, ?3) \
             ON CONFLICT(material_id) DO UPDATE SET \
             quantity = excluded.quantity, location = excluded.location",
            params![material_id, quantity, location],
        )?;
        let inventory = session.query_row(
            &format!("SELECT {INVENTORY_COLUMNS} FROM inventory i WHERE i.material_id = ?1"),
            params![material_id],
            |row| {
                Ok(Inventory {
                    id: row.get(0)?,
                    material_id: row.get(1)?,
                    quantity: row.get(2)?,
                    location: row.get(3)?,
                })
            },
        )?;
        session.commit()?;
        debug!(material_id, quantity, location = %inventory.location, "updated stock");

        Ok(inventory)
    }

    /// Places a pending order dated today.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if the quantity is not positive.
    /// - [`StoreError::NotFound`] if the material, or the resolved supplier,
    ///   does not exist.
    /// - [`StoreError::UnresolvedSupplier`] if no supplier was given and the
    ///   material has no default.
    pub fn create_order(&self, input: &NewOrder) -> Result<OrderDetail> {
        if input.quantity <= 0.0 || !input.quantity.is_finite() {
            return Err(ValidationError::NotPositive(input.quantity.to_string()).into());
        }

        let session = self.store.session()?;
        let material = load_material(&session, input.material_id)?
            .ok_or_else(|| StoreError::not_found("Material", input.material_id))?;
        let supplier_id = input
            .supplier_id
            .or(material.supplier_id)
            .ok_or(StoreError::UnresolvedSupplier {
                material_id: material.id,
            })?;
        let supplier = load_supplier(&session, supplier_id)?
            .ok_or_else(|| StoreError::not_found("Supplier", supplier_id))?;

        let order_date = today();
        session.execute(
            "INSERT INTO orders (material_id, supplier_id, quantity, order_date, delivery_date, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                material.id,
                supplier.id,
                input.quantity,
                order_date,
                input.delivery_date,
                ORDER_STATUS_PENDING,
            ],
        )?;
        let id = session.last_insert_rowid();
        session.commit()?;
        debug!(id, material_id = material.id, supplier_id = supplier.id, "created order");

        Ok(OrderDetail {
            order: Order {
                id,
                material_id: material.id,
                supplier_id: supplier.id,
                quantity: input.quantity,
                order_date,
                delivery_date: input.delivery_date,
                status: ORDER_STATUS_PENDING.to_string(),
            },
            material,
            supplier,
        })
    }

    /// Lists orders with their material and supplier, in insertion order.
    pub fn list_orders(&self) -> Result<Vec<OrderDetail>> {
        let session = self.store.session()?;
        let mut stmt = session.prepare(&format!("{} ORDER BY o.id", order_detail_select()))?;
        let orders = stmt
            .query_map([], order_detail_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    /// Loads a single order with its material and supplier.
    pub fn get_order(&self, id: RecordId) -> Result<Option<OrderDetail>> {
        let session = self.store.session()?;
        load_order_detail(&session, id)
    }

    /// Moves an order to a new status, optionally setting its delivery date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no order has the given id, or
    /// [`StoreError::Validation`] for a blank status.
    pub fn update_order_status(
        &self,
        id: RecordId,
        status: &str,
        delivery_date: Option<NaiveDate>,
    ) -> Result<OrderDetail> {
        let status = require_text("order status", status)?;

        let session = self.store.session()?;
        let rows = session.execute(
            "UPDATE orders SET status = ?1, delivery_date = COALESCE(?2, delivery_date) \
             WHERE id = ?3",
            params![status, delivery_date, id],
        )?;
        if rows == 0 {
            return Err(StoreError::not_found("Order", id));
        }
        let detail =
            load_order_detail(&session, id)?.ok_or_else(|| StoreError::not_found("Order", id))?;
        session.commit()?;
        debug!(id, status = %detail.order.status, "updated order status");

        Ok(detail)
    }

    /// Deletes a material that no order references.
    ///
    /// The material's inventory row is removed with it. Returns the deleted
    /// material.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the material does not exist, or
    /// [`StoreError::MaterialInUse`] if any order references it.
    pub fn delete_material(&self, id: RecordId) -> Result<Material> {
        let session = self.store.session()?;
        let material =
            load_material(&session, id)?.ok_or_else(|| StoreError::not_found("Material", id))?;

        let orders: i64 = session.query_row(
            "SELECT COUNT(*) FROM orders WHERE material_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if orders > 0 {
            return Err(StoreError::MaterialInUse {
                material_id: id,
                orders,
            });
        }

        session.execute("DELETE FROM materials WHERE id = ?1", params![id])?;
        session.commit()?;
        debug!(id, "deleted material");

        Ok(material)
    }
}

/// Returns the id of the first supplier named exactly `name`, creating one
/// if none exists.
fn find_or_create_supplier(conn: &Connection, name: &str) -> Result<RecordId> {
    let existing: Option<RecordId> = conn
        .query_row(
            "SELECT id FROM suppliers WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute("INSERT INTO suppliers (name) VALUES (?1)", params![name])?;
    let id = conn.last_insert_rowid();
    debug!(id, name, "created supplier for material");
    Ok(id)
}
