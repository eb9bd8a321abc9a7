//! Conversion between SQLite rows and record types.
//!
//! Each `*_COLUMNS` constant lists the columns a matching `*_at` function
//! expects, in order, using the table aliases the services query with
//! (`p`, `ph`, `ms`, `s`, `m`, `i`, `o`). The `offset` argument lets joined
//! queries decode several records from one row.

use chrono::{Local, NaiveDate};
use construction_core::{
    Inventory, InventoryEntry, Material, Milestone, Order, OrderDetail, Phase, Project,
    RecordId, Supplier,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::Result;

pub(crate) const PROJECT_COLUMNS: &str =
    "p.id, p.name, p.location, p.budget, p.start_date, p.end_date, p.status";
pub(crate) const PHASE_COLUMNS: &str =
    "ph.id, ph.project_id, ph.name, ph.duration, ph.start_date, ph.status";
pub(crate) const MILESTONE_COLUMNS: &str =
    "ms.id, ms.project_id, ms.name, ms.target_date, ms.completion_date, ms.status";
pub(crate) const SUPPLIER_COLUMNS: &str = "s.id, s.name, s.contact";
pub(crate) const MATERIAL_COLUMNS: &str =
    "m.id, m.name, m.unit, m.cost_per_unit, m.supplier_id";
pub(crate) const INVENTORY_COLUMNS: &str = "i.id, i.material_id, i.quantity, i.location";
pub(crate) const ORDER_COLUMNS: &str =
    "o.id, o.material_id, o.supplier_id, o.quantity, o.order_date, o.delivery_date, o.status";

#[cfg(test)]
const SUPPLIER_WIDTH: usize = 3;
const MATERIAL_WIDTH: usize = 5;
const ORDER_WIDTH: usize = 7;

pub(crate) fn project_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        location: row.get(offset + 2)?,
        budget: row.get(offset + 3)?,
        start_date: row.get(offset + 4)?,
        end_date: row.get(offset + 5)?,
        status: row.get(offset + 6)?,
    })
}

pub(crate) fn phase_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Phase> {
    Ok(Phase {
        id: row.get(offset)?,
        project_id: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        duration: row.get(offset + 3)?,
        start_date: row.get(offset + 4)?,
        status: row.get(offset + 5)?,
    })
}

pub(crate) fn milestone_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(offset)?,
        project_id: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        target_date: row.get(offset + 3)?,
        completion_date: row.get(offset + 4)?,
        status: row.get(offset + 5)?,
    })
}

pub(crate) fn supplier_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        contact: row.get(offset + 2)?,
    })
}

pub(crate) fn material_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Material> {
    Ok(Material {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        unit: row.get(offset + 2)?,
        cost_per_unit: row.get(offset + 3)?,
        supplier_id: row.get(offset + 4)?,
    })
}

/// Decodes an inventory row that may be absent (left join).
pub(crate) fn inventory_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<Inventory>> {
    let Some(id) = row.get::<_, Option<RecordId>>(offset)? else {
        return Ok(None);
    };
    Ok(Some(Inventory {
        id,
        material_id: row.get(offset + 1)?,
        quantity: row.get(offset + 2)?,
        location: row.get(offset + 3)?,
    }))
}

pub(crate) fn order_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(offset)?,
        material_id: row.get(offset + 1)?,
        supplier_id: row.get(offset + 2)?,
        quantity: row.get(offset + 3)?,
        order_date: row.get(offset + 4)?,
        delivery_date: row.get(offset + 5)?,
        status: row.get(offset + 6)?,
    })
}

/// Decodes `MATERIAL_COLUMNS, INVENTORY_COLUMNS`.
pub(crate) fn inventory_entry_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryEntry> {
    Ok(InventoryEntry {
        material: material_at(row, 0)?,
        inventory: inventory_at(row, MATERIAL_WIDTH)?,
    })
}

/// Decodes `ORDER_COLUMNS, MATERIAL_COLUMNS, SUPPLIER_COLUMNS`.
pub(crate) fn order_detail_from_row(row: &Row<'_>) -> rusqlite::Result<OrderDetail> {
    Ok(OrderDetail {
        order: order_at(row, 0)?,
        material: material_at(row, ORDER_WIDTH)?,
        supplier: supplier_at(row, ORDER_WIDTH + MATERIAL_WIDTH)?,
    })
}

/// Select clause for [`order_detail_from_row`].
pub(crate) fn order_detail_select() -> String {
    format!(
        "SELECT {ORDER_COLUMNS}, {MATERIAL_COLUMNS}, {SUPPLIER_COLUMNS} FROM orders o \
         JOIN materials m ON m.id = o.material_id \
         JOIN suppliers s ON s.id = o.supplier_id"
    )
}

pub(crate) fn load_project(conn: &Connection, id: RecordId) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?1"),
            params![id],
            |row| project_at(row, 0),
        )
        .optional()?;
    Ok(project)
}

pub(crate) fn load_milestone(conn: &Connection, id: RecordId) -> Result<Option<Milestone>> {
    let milestone = conn
        .query_row(
            &format!("SELECT {MILESTONE_COLUMNS} FROM milestones ms WHERE ms.id = ?1"),
            params![id],
            |row| milestone_at(row, 0),
        )
        .optional()?;
    Ok(milestone)
}

pub(crate) fn load_supplier(conn: &Connection, id: RecordId) -> Result<Option<Supplier>> {
    let supplier = conn
        .query_row(
            &format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers s WHERE s.id = ?1"),
            params![id],
            |row| supplier_at(row, 0),
        )
        .optional()?;
    Ok(supplier)
}

pub(crate) fn load_material(conn: &Connection, id: RecordId) -> Result<Option<Material>> {
    let material = conn
        .query_row(
            &format!("SELECT {MATERIAL_COLUMNS} FROM materials m WHERE m.id = ?1"),
            params![id],
            |row| material_at(row, 0),
        )
        .optional()?;
    Ok(material)
}

pub(crate) fn load_order_detail(conn: &Connection, id: RecordId) -> Result<Option<OrderDetail>> {
    let detail = conn
        .query_row(
            &format!("{} WHERE o.id = ?1", order_detail_select()),
            params![id],
            order_detail_from_row,
        )
        .optional()?;
    Ok(detail)
}

/// Trims optional free text, treating blank input as absent.
pub(crate) fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Current local calendar date.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  Dock 4 ")), Some("Dock 4".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn test_column_widths_match_decoders() {
        assert_eq!(SUPPLIER_COLUMNS.split(',').count(), SUPPLIER_WIDTH);
        assert_eq!(MATERIAL_COLUMNS.split(',').count(), MATERIAL_WIDTH);
        assert_eq!(ORDER_COLUMNS.split(',').count(), ORDER_WIDTH);
    }

    #[test]
    fn test_inventory_at_absent_row() {
        let conn = Connection::open_in_memory().unwrap();
        let inventory = conn
            .query_row("SELECT NULL, NULL, NULL, NULL", [], |row| {
                inventory_at(row, 0)
            })
            .unwrap();
        assert!(inventory.is_none());
    }

    #[test]
    fn test_dates_decode_from_text() {
        let conn = Connection::open_in_memory().unwrap();
        let project = conn
            .query_row(
                "SELECT 1, 'Riverside', NULL, 100000.0, '2024-03-01', NULL, 'active'",
                [],
                |row| project_at(row, 0),
            )
            .unwrap();
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(project.end_date.is_none());
        assert_eq!(project.budget, Some(100_000.0));
    }
}
