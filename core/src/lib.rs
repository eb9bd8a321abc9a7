//! Core record types and input validation for construction project tracking.
//!
//! This crate defines the data model shared by the storage backend and the
//! command-line interface:
//!
//! - [`Project`], [`Phase`], [`Milestone`] — project execution tracking.
//! - [`Material`], [`Supplier`], [`Inventory`], [`Order`] — procurement and
//!   stock.
//! - [`InventoryEntry`], [`OrderDetail`] — joined views returned by list
//!   queries.
//! - [`NewProject`], [`ProjectUpdate`], [`NewMaterial`], [`NewOrder`] —
//!   inputs for create/update operations.
//!
//! Field parsing ([`parse_amount`], [`parse_date`], [`parse_id`], ...)
//! turns raw user input into typed values or a [`ValidationError`].
//!
//! # Example
//!
//! ```
//! use construction_core::*;
//!
//! let material = NewMaterial::new("Cement", "bag")
//!     .with_cost(parse_amount("5.50").unwrap())
//!     .with_supplier("AcmeCo");
//! assert_eq!(material.cost_per_unit, Some(5.5));
//! assert_eq!(parse_date("2024-06-01").unwrap().to_string(), "2024-06-01");
//! ```

mod types;
mod validate;

pub use types::*;
pub use validate::{
    DATE_FORMAT, ValidationError, parse_amount, parse_date, parse_days, parse_id,
    parse_quantity, parse_stock_level, require_text,
};
