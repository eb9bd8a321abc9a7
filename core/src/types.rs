//! Record types for projects, materials, and their related rows.
//!
//! Every record mirrors one table row and carries its store-assigned `id`.
//! The types are plain data: persistence lives in `construction-sqlite`,
//! presentation lives in the CLI. Joined views ([`InventoryEntry`],
//! [`OrderDetail`]) are fully populated by a single query rather than
//! traversed lazily.

use chrono::NaiveDate;

/// Store-assigned row identifier.
pub type RecordId = i64;

/// Status given to a newly created project.
pub const PROJECT_STATUS_ACTIVE: &str = "active";
/// Status given to a newly created phase.
pub const PHASE_STATUS_PLANNED: &str = "planned";
/// Status given to a newly created milestone.
pub const MILESTONE_STATUS_PENDING: &str = "pending";
/// Status a milestone moves to once completed.
pub const MILESTONE_STATUS_COMPLETED: &str = "completed";
/// Status given to a newly created order.
pub const ORDER_STATUS_PENDING: &str = "pending";
/// Location used for stock when none is given.
pub const DEFAULT_STOCK_LOCATION: &str = "warehouse";

/// A construction project.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: RecordId,
    pub name: String,
    pub location: Option<String>,
    /// Budget in currency units; never negative.
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
}

/// A named stage of a project's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub id: RecordId,
    pub project_id: RecordId,
    pub name: String,
    /// Planned duration in days.
    pub duration: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub status: String,
}

/// A dated checkpoint within a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    pub id: RecordId,
    pub project_id: RecordId,
    pub name: String,
    pub target_date: Option<NaiveDate>,
    /// Set only once the milestone is completed.
    pub completion_date: Option<NaiveDate>,
    pub status: String,
}

impl Milestone {
    /// Returns `true` once the milestone has been marked completed.
    pub fn is_completed(&self) -> bool {
        self.status == MILESTONE_STATUS_COMPLETED
    }
}

/// A vendor of materials.
#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    pub id: RecordId,
    pub name: String,
    pub contact: Option<String>,
}

/// A purchasable construction input.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: RecordId,
    pub name: String,
    /// Unit of measure (e.g. `bag`, `ton`, `cubic-yard`).
    pub unit: String,
    pub cost_per_unit: Option<f64>,
    /// Default supplier used when an order names none.
    pub supplier_id: Option<RecordId>,
}

/// On-hand stock for one material.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub id: RecordId,
    pub material_id: RecordId,
    pub quantity: f64,
    pub location: String,
}

/// A purchase request for one material from one supplier.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: RecordId,
    pub material_id: RecordId,
    pub supplier_id: RecordId,
    pub quantity: f64,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub status: String,
}

/// A material together with its inventory row, if it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub material: Material,
    pub inventory: Option<Inventory>,
}

impl InventoryEntry {
    /// On-hand quantity; a material that was never stocked counts as zero.
    pub fn quantity(&self) -> f64 {
        self.inventory.as_ref().map_or(0.0, |inv| inv.quantity)
    }

    /// Stock location, if the material has an inventory row.
    pub fn location(&self) -> Option<&str> {
        self.inventory.as_ref().map(|inv| inv.location.as_str())
    }
}

/// An order with its material and supplier rows joined in.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    pub material: Material,
    pub supplier: Supplier,
}

impl OrderDetail {
    /// Quantity times the material's unit cost. Not persisted.
    ///
    /// Returns `None` when the material has no cost recorded.
    pub fn total_cost(&self) -> Option<f64> {
        self.material
            .cost_per_unit
            .map(|cost| cost * self.order.quantity)
    }
}

/// Input for creating a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub budget: Option<f64>,
    /// Raw `YYYY-MM-DD` text; an unparsable value is dropped on insert.
    pub start_date: Option<String>,
    pub location: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Partial update of a project; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub budget: Option<f64>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProjectUpdate {
    /// Returns `true` if no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.budget.is_none()
            && self.status.is_none()
            && self.location.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Input for registering a material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMaterial {
    pub name: String,
    pub unit: String,
    pub cost_per_unit: Option<f64>,
    /// Supplier to link, matched by exact name and created when missing.
    pub supplier_name: Option<String>,
}

impl NewMaterial {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            ..Self::default()
        }
    }

    pub fn with_cost(mut self, cost_per_unit: f64) -> Self {
        self.cost_per_unit = Some(cost_per_unit);
        self
    }

    pub fn with_supplier(mut self, supplier_name: impl Into<String>) -> Self {
        self.supplier_name = Some(supplier_name.into());
        self
    }
}

/// Input for placing an order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub material_id: RecordId,
    pub quantity: f64,
    /// Explicit supplier; falls back to the material's default when `None`.
    pub supplier_id: Option<RecordId>,
    pub delivery_date: Option<NaiveDate>,
}

impl NewOrder {
    pub fn new(material_id: RecordId, quantity: f64) -> Self {
        Self {
            material_id,
            quantity,
            supplier_id: None,
            delivery_date: None,
        }
    }

    pub fn with_supplier(mut self, supplier_id: RecordId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn with_delivery_date(mut self, delivery_date: NaiveDate) -> Self {
        self.delivery_date = Some(delivery_date);
        self
    }
}
