//! Project, phase, and milestone operations.
//!
//! [`ProjectService`] wraps a [`Store`] and runs every operation inside its
//! own [`Session`](crate::Session). Reads of a single row return
//! `Ok(None)` when the row is missing; mutations that target a missing row
//! return [`StoreError::NotFound`].
//!
//! # Example
//!
//! ```no_run
//! use construction_core::NewProject;
//! use construction_sqlite::{ProjectService, Store};
//!
//! let store = Store::open("construction.db").unwrap();
//! store.init().unwrap();
//!
//! let projects = ProjectService::new(&store);
//! let project = projects
//!     .create_project(&NewProject::new("Riverside").with_budget(100_000.0))
//!     .unwrap();
//! projects.add_phase(project.id, "Foundation", Some(30), None).unwrap();
//! ```

use chrono::NaiveDate;
use construction_core::{
    DATE_FORMAT, MILESTONE_STATUS_COMPLETED, MILESTONE_STATUS_PENDING, Milestone, NewProject,
    PHASE_STATUS_PLANNED, PROJECT_STATUS_ACTIVE, Phase, Project, ProjectUpdate, RecordId,
    ValidationError, parse_date, require_text,
};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tracing::{debug, warn};

use crate::convert::{
    MILESTONE_COLUMNS, PHASE_COLUMNS, PROJECT_COLUMNS, clean_text, load_milestone, load_project,
    milestone_at, phase_at, project_at, today,
};
use crate::error::{Result, StoreError};
use crate::store::Store;

/// Operations on projects and their phases and milestones.
pub struct ProjectService<'a> {
    store: &'a Store,
}

impl<'a> ProjectService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Creates a project with status `active`.
    ///
    /// A negative budget or a start date that is not `YYYY-MM-DD` is
    /// dropped with a warning; the project is still created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the name is blank.
    pub fn create_project(&self, input: &NewProject) -> Result<Project> {
        let name = require_text("project name", &input.name)?;
        let budget = sanitize_budget(input.budget);
        let start_date = clean_text(input.start_date.as_deref()).and_then(|raw| {
            parse_date(&raw)
                .inspect_err(|err| warn!(%err, "dropping project start date"))
                .ok()
        });
        let location = clean_text(input.location.as_deref());

        let session = self.store.session()?;
        session.execute(
            "INSERT INTO projects (name, location, budget, start_date, status) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, location, budget, start_date, PROJECT_STATUS_ACTIVE],
        )?;
        let id = session.last_insert_rowid();
        session.commit()?;
        debug!(id, name = %name, "created project");

        Ok(Project {
            id,
            name,
            location,
            budget,
            start_date,
            end_date: None,
            status: PROJECT_STATUS_ACTIVE.to_string(),
        })
    }

    /// Lists projects in insertion order, optionally only those whose status
    /// matches `status` exactly.
    pub fn list_projects(&self, status: Option<&str>) -> Result<Vec<Project>> {
        let session = self.store.session()?;
        let mut stmt = session.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p \
             WHERE ?1 IS NULL OR p.status = ?1 ORDER BY p.id"
        ))?;
        let projects = stmt
            .query_map(params![status], |row| project_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Loads a single project by id.
    pub fn get_project(&self, id: RecordId) -> Result<Option<Project>> {
        let session = self.store.session()?;
        load_project(&session, id)
    }

    /// Applies the provided fields of `update` to a project.
    ///
    /// Blank text fields and a negative budget are ignored. Returns the
    /// project as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no project has the given id.
    pub fn update_project(&self, id: RecordId, update: &ProjectUpdate) -> Result<Project> {
        let session = self.store.session()?;
        let Some(current) = load_project(&session, id)? else {
            return Err(StoreError::not_found("Project", id));
        };
        if update.is_empty() {
            debug!(id, "no project fields to update");
            return Ok(current);
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        let mut assign = |column: &str, value: Value| {
            values.push(value);
            assignments.push(format!("{column} = ?{}", values.len()));
        };

        if let Some(name) = clean_text(update.name.as_deref()) {
            assign("name", Value::Text(name));
        }
        if let Some(budget) = sanitize_budget(update.budget) {
            assign("budget", Value::Real(budget));
        }
        if let Some(status) = clean_text(update.status.as_deref()) {
            assign("status", Value::Text(status));
        }
        if let Some(location) = clean_text(update.location.as_deref()) {
            assign("location", Value::Text(location));
        }
        if let Some(date) = update.start_date {
            assign("start_date", Value::Text(date.format(DATE_FORMAT).to_string()));
        }
        if let Some(date) = update.end_date {
            assign("end_date", Value::Text(date.format(DATE_FORMAT).to_string()));
        }

        if !assignments.is_empty() {
            values.push(Value::Integer(id));
            session.execute(
                &format!(
                    "UPDATE projects SET {} WHERE id = ?{}",
                    assignments.join(", "),
                    values.len()
                ),
                params_from_iter(values.iter()),
            )?;
            debug!(id, fields = assignments.len(), "updated project");
        }

        let project =
            load_project(&session, id)?.ok_or_else(|| StoreError::not_found("Project", id))?;
        session.commit()?;
        Ok(project)
    }

    /// Adds a phase with status `planned` to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the project does not exist, or
    /// [`StoreError::Validation`] for a blank name or negative duration.
    pub fn add_phase(
        &self,
        project_id: RecordId,
        name: &str,
        duration: Option<i64>,
        start_date: Option<NaiveDate>,
    ) -> Result<Phase> {
        let name = require_text("phase name", name)?;
        if let Some(days) = duration.filter(|d| *d < 0) {
            return Err(ValidationError::Negative(days.to_string()).into());
        }

        let session = self.store.session()?;
        ensure_project(&session, project_id)?;
        session.execute(
            "INSERT INTO phases (project_id, name, duration, start_date, status) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![project_id, name, duration, start_date, PHASE_STATUS_PLANNED],
        )?;
        let id = session.last_insert_rowid();
        session.commit()?;
        debug!(id, project_id, "added phase");

        Ok(Phase {
            id,
            project_id,
            name,
            duration,
            start_date,
            status: PHASE_STATUS_PLANNED.to_string(),
        })
    }

    /// Lists a project's phases in insertion order.
    pub fn list_phases(&self, project_id: RecordId) -> Result<Vec<Phase>> {
        let session = self.store.session()?;
        let mut stmt = session.prepare(&format!(
            "SELECT {PHASE_COLUMNS} FROM phases ph WHERE ph.project_id = ?1 ORDER BY ph.id"
        ))?;
        let phases = stmt
            .query_map(params![project_id], |row| phase_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(phases)
    }

    /// Adds a pending milestone to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the project does not exist.
    pub fn add_milestone(
        &self,
        project_id: RecordId,
        name: &str,
        target_date: Option<NaiveDate>,
    ) -> Result<Milestone> {
        let name = require_text("milestone name", name)?;

        let session = self.store.session()?;
        ensure_project(&session, project_id)?;
        session.execute(
            "INSERT INTO milestones (project_id, name, target_date, status) \
             VALUES (?1, ?2, ?3, ?4)",
            params![project_id, name, target_date, MILESTONE_STATUS_PENDING],
        )?;
        let id = session.last_insert_rowid();
        session.commit()?;
        debug!(id, project_id, "added milestone");

        Ok(Milestone {
            id,
            project_id,
            name,
            target_date,
            completion_date: None,
            status: MILESTONE_STATUS_PENDING.to_string(),
        })
    }

    /// Lists a project's milestones in insertion order.
    pub fn list_milestones(&self, project_id: RecordId) -> Result<Vec<Milestone>> {
        let session = self.store.session()?;
        let mut stmt = session.prepare(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM milestones ms \
             WHERE ms.project_id = ?1 ORDER BY ms.id"
        ))?;
        let milestones = stmt
            .query_map(params![project_id], |row| milestone_at(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(milestones)
    }

    /// Marks a milestone completed, stamped with today's date.
    ///
    /// Completing an already completed milestone restamps the date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no milestone has the given id.
    pub fn complete_milestone(&self, id: RecordId) -> Result<Milestone> {
        let session = self.store.session()?;
        let Some(mut milestone) = load_milestone(&session, id)? else {
            return Err(StoreError::not_found("Milestone", id));
        };

        let restamp = milestone.is_completed();
        let completed_on = today();
        session.execute(
            "UPDATE milestones SET status = ?1, completion_date = ?2 WHERE id = ?3",
            params![MILESTONE_STATUS_COMPLETED, completed_on, id],
        )?;
        session.commit()?;
        debug!(id, %completed_on, restamp, "completed milestone");

        milestone.status = MILESTONE_STATUS_COMPLETED.to_string();
        milestone.completion_date = Some(completed_on);
        Ok(milestone)
    }
}

fn ensure_project(conn: &Connection, project_id: RecordId) -> Result<()> {
    match load_project(conn, project_id)? {
        Some(_) => Ok(()),
        None => Err(StoreError::not_found("Project", project_id)),
    }
}

fn sanitize_budget(budget: Option<f64>) -> Option<f64> {
    match budget {
        Some(value) if value < 0.0 || !value.is_finite() => {
            warn!(budget = value, "dropping invalid project budget");
            None
        }
        other => other,
    }
}
