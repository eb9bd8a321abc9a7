//! SQLite storage backend and services for construction project tracking.
//!
//! This crate persists the records defined in
//! [`construction_core`] in a single local SQLite file and exposes the
//! operations the command-line tool is built on.
//!
//! # Architecture
//!
//! - **`schema`** — table and index definitions
//! - **`store`** — connection lifecycle, idempotent table creation, and
//!   scoped sessions (one transaction per operation)
//! - **`convert`** — row ↔ record conversion, including joined rows
//! - **`project`** — [`ProjectService`]: projects, phases, milestones
//! - **`material`** — [`MaterialService`]: materials, suppliers, inventory,
//!   orders
//!
//! # Quick start
//!
//! ```no_run
//! use construction_core::NewProject;
//! use construction_sqlite::{ProjectService, Store};
//!
//! let store = Store::open("construction.db").unwrap();
//! store.init().unwrap();
//!
//! let projects = ProjectService::new(&store);
//! projects.create_project(&NewProject::new("Riverside")).unwrap();
//! for project in projects.list_projects(None).unwrap() {
//!     println!("{}. {}", project.id, project.name);
//! }
//! ```
//!
//! # Error model
//!
//! Every operation returns [`Result`]. Only [`StoreError::is_fatal`] errors
//! indicate a broken store; the rest (missing rows, rejected input, an
//! order without a resolvable supplier, a material still referenced by
//! orders) are expected outcomes for the caller to report.

mod convert;
mod error;
mod material;
mod project;
mod schema;
mod store;

pub use error::{Result, StoreError};
pub use material::MaterialService;
pub use project::ProjectService;
pub use schema::generate_schema_sql;
pub use store::{Session, Store, StoreStatus};
