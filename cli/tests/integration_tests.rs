use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// A scratch directory holding the database file; every run uses it as
/// the working directory so no stray config file is picked up.
struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("site.db")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_buildcli"));
        cmd.current_dir(self.dir.path())
            .env_remove("BUILDCLI_DB")
            .env_remove("BUILDCLI_CONFIG")
            .env_remove("BUILDCLI_LOG")
            .arg("--db")
            .arg(self.db())
            .args(args);
        cmd
    }

    /// Runs with stdin closed.
    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .stdin(Stdio::null())
            .output()
            .expect("failed to run buildcli")
    }

    /// Runs with `input` piped to stdin.
    fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn buildcli");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().expect("failed to wait for buildcli")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_ok(output: &Output) -> String {
    assert!(
        output.status.success(),
        "buildcli failed\nstdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
    stdout(output)
}

// ---------------------------------------------------------------------------
// End-to-end flow
// ---------------------------------------------------------------------------

#[test]
fn project_and_order_flow() {
    let site = Site::new();

    let out = assert_ok(&site.run(&["project", "create", "Riverside", "--budget", "100000"]));
    assert!(out.contains("Created project: Riverside (ID: 1)"));
    assert!(out.contains("Budget: $100,000.00"));

    let out = assert_ok(&site.run(&["project", "list"]));
    assert!(out.contains("Project List:"));
    assert!(out.contains("1. Riverside - $100,000 - active"));

    let out = assert_ok(&site.run(&[
        "materials",
        "add",
        "Cement",
        "--unit",
        "bag",
        "--cost-per-unit",
        "5.50",
        "--supplier",
        "AcmeCo",
    ]));
    assert!(out.contains("Added material: Cement (ID: 1)"));
    assert!(out.contains("Supplier: AcmeCo"));

    let out = assert_ok(&site.run(&["materials", "list"]));
    assert!(out.contains("1. Cement - bag - $5.50"));

    let out = assert_ok(&site.run(&["materials", "suppliers", "list"]));
    assert!(out.contains("1. AcmeCo - N/A"));

    let out = assert_ok(&site.run(&[
        "materials",
        "order",
        "--material-id",
        "1",
        "--quantity",
        "20",
    ]));
    assert!(out.contains("Order created (ID: 1)"));
    assert!(out.contains("Supplier: AcmeCo"));
    assert!(out.contains("Total Cost: $110.00"));
    assert!(out.contains("Delivery Date: TBD"));

    let out = assert_ok(&site.run(&["materials", "orders"]));
    assert!(out.contains("1. Cement - 20 bag - AcmeCo - $110.00 - pending - Delivery: TBD"));
}

#[test]
fn data_persists_across_runs() {
    let site = Site::new();
    assert_ok(&site.run(&["project", "create", "Dock", "--location", "Pier 4"]));
    assert!(site.db().exists());

    let out = assert_ok(&site.run(&["project", "status", "--project-id", "1"]));
    assert!(out.contains("Project: Dock"));
    assert!(out.contains("Status: active"));
    assert!(out.contains("Budget: N/A"));
    assert!(out.contains("Location: Pier 4"));
    assert!(out.contains("Start Date: N/A"));
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[test]
fn empty_project_list() {
    let site = Site::new();
    let out = assert_ok(&site.run(&["project", "list"]));
    assert!(out.contains("No projects found."));
}

#[test]
fn invalid_optional_flag_is_dropped() {
    let site = Site::new();
    let output = site.run(&[
        "project",
        "create",
        "Annex",
        "--budget",
        "lots",
        "--start-date",
        "03/01/2024",
    ]);
    let out = assert_ok(&output);
    assert!(out.contains("Created project: Annex (ID: 1)"));
    assert!(!out.contains("Budget:"));
    assert!(!out.contains("Start Date:"));
    assert!(stderr(&output).contains("WARN"));
}

#[test]
fn project_status_missing_is_not_an_error() {
    let site = Site::new();
    let out = assert_ok(&site.run(&["project", "status", "--project-id", "42"]));
    assert!(out.contains("Project not found"));
}

#[test]
fn project_update_and_status_filter() {
    let site = Site::new();
    assert_ok(&site.run(&["project", "create", "Riverside"]));
    assert_ok(&site.run(&["project", "create", "Hillside"]));

    let out = assert_ok(&site.run(&[
        "project",
        "update",
        "--project-id",
        "2",
        "--status",
        "on-hold",
        "--budget",
        "2500",
    ]));
    assert!(out.contains("Project updated successfully"));

    let out = assert_ok(&site.run(&["project", "list", "--status", "on-hold"]));
    assert!(out.contains("2. Hillside - $2,500 - on-hold"));
    assert!(!out.contains("Riverside"));

    let out = assert_ok(&site.run(&["project", "update", "--project-id", "9", "--name", "X"]));
    assert!(out.contains("Project not found"));
}

#[test]
fn interactive_project_create_retries_invalid_input() {
    let site = Site::new();
    let output = site.run_with_input(
        &["project", "create"],
        "\nRiverside\nabc\n250000\nnot-a-date\n2024-03-01\n\n",
    );
    let out = assert_ok(&output);
    assert!(out.contains("Error: a value is required. Please try again."));
    assert!(out.contains("not a valid number"));
    assert!(out.contains("not a valid date"));
    assert!(out.contains("Created project: Riverside (ID: 1)"));
    assert!(out.contains("Budget: $250,000.00"));
    assert!(out.contains("Start Date: 2024-03-01"));
    assert!(!out.contains("Location:"));
}

#[test]
fn aborted_prompt_writes_nothing() {
    let site = Site::new();
    let output = site.run_with_input(&["project", "create"], "Riverside\n");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nothing was saved"));

    let out = assert_ok(&site.run(&["project", "list"]));
    assert!(out.contains("No projects found."));
}

#[test]
fn phases_and_milestones() {
    let site = Site::new();
    assert_ok(&site.run(&["project", "create", "Riverside"]));

    let out = assert_ok(&site.run(&[
        "project",
        "phases",
        "add",
        "--project-id",
        "1",
        "--name",
        "Foundation",
        "--duration",
        "30",
    ]));
    assert!(out.contains("Added phase: Foundation (ID: 1) to project Riverside"));
    assert_ok(&site.run(&["project", "phases", "add", "--project-id", "1", "--name", "Framing"]));

    let out = assert_ok(&site.run(&["project", "phases", "list", "--project-id", "1"]));
    assert!(out.contains("Phases for Riverside:"));
    assert!(out.contains("1. Foundation - 30 days - planned"));
    assert!(out.contains("2. Framing - N/A days - planned"));

    let out = assert_ok(&site.run(&[
        "project",
        "milestones",
        "add",
        "--project-id",
        "1",
        "--name",
        "Slab poured",
        "--target-date",
        "2024-06-01",
    ]));
    assert!(out.contains("Added milestone: Slab poured (ID: 1)"));
    assert!(!out.contains("to project"));
    assert!(out.contains("Target Date: 2024-06-01"));

    let out = assert_ok(&site.run(&["project", "milestones", "complete", "--milestone-id", "1"]));
    assert!(out.contains("Milestone 'Slab poured' marked as completed on "));

    let out = assert_ok(&site.run(&["project", "milestones", "list", "--project-id", "1"]));
    assert!(out.contains("Milestones for Riverside:"));
    assert!(out.contains("1. Slab poured - Target: 2024-06-01 - completed - Completed: "));
}

#[test]
fn phase_for_missing_project() {
    let site = Site::new();
    let out = assert_ok(&site.run(&[
        "project",
        "phases",
        "add",
        "--project-id",
        "3",
        "--name",
        "Roofing",
    ]));
    assert!(out.contains("Project not found"));
}

#[test]
fn interactive_phase_add_selects_project() {
    let site = Site::new();
    assert_ok(&site.run(&["project", "create", "Riverside"]));

    let out = assert_ok(&site.run_with_input(
        &["project", "phases", "add"],
        "1\nExcavation\nten\n10\n\n",
    ));
    assert!(out.contains("Available projects:"));
    assert!(out.contains("Added phase: Excavation (ID: 1) to project Riverside"));

    let out = assert_ok(&site.run(&["project", "phases", "list", "--project-id", "1"]));
    assert!(out.contains("1. Excavation - 10 days - planned"));
}

#[test]
fn partial_flags_prompt_only_for_missing_fields() {
    let site = Site::new();
    assert_ok(&site.run(&["project", "create", "Riverside"]));

    // Only the name is missing; stdin holds nothing else to answer.
    let out = assert_ok(&site.run_with_input(
        &[
            "project",
            "phases",
            "add",
            "--project-id",
            "1",
            "--duration",
            "30",
            "--start-date",
            "2024-03-01",
        ],
        "Foundation\n",
    ));
    assert!(out.contains("Added phase: Foundation (ID: 1) to project Riverside"));
    let out = assert_ok(&site.run(&["project", "phases", "list", "--project-id", "1"]));
    assert!(out.contains("1. Foundation - 30 days - planned"));

    let out = assert_ok(&site.run_with_input(
        &[
            "project",
            "milestones",
            "add",
            "--project-id",
            "1",
            "--target-date",
            "2024-05-01",
        ],
        "Slab poured\n",
    ));
    assert!(out.contains("Added milestone: Slab poured (ID: 1)"));
    assert!(out.contains("Target Date: 2024-05-01"));

    let out = assert_ok(&site.run_with_input(
        &[
            "materials",
            "add",
            "Cement",
            "--cost-per-unit",
            "5.50",
            "--supplier",
            "AcmeCo",
        ],
        "bag\n",
    ));
    assert!(out.contains("Cost per unit: $5.50"));
    assert!(out.contains("Supplier: AcmeCo"));

    // Material is picked from the list; the blank line skips the supplier.
    let out = assert_ok(&site.run_with_input(
        &[
            "materials",
            "order",
            "--quantity",
            "20",
            "--delivery-date",
            "2024-06-01",
        ],
        "1\n\n",
    ));
    assert!(out.contains("Quantity: 20 bag"));
    assert!(out.contains("Total Cost: $110.00"));
    assert!(out.contains("Delivery Date: 2024-06-01"));

    let out = assert_ok(&site.run_with_input(
        &["materials", "stock", "--quantity", "12", "--location", "Yard B"],
        "1\n",
    ));
    assert!(out.contains("Updated stock for Cement: 12 bag at Yard B"));
}

// ---------------------------------------------------------------------------
// Materials, inventory, orders
// ---------------------------------------------------------------------------

#[test]
fn interactive_material_add() {
    let site = Site::new();
    let out = assert_ok(&site.run_with_input(
        &["materials", "add"],
        "Rebar\nton\n$1,200\nSteelWorks\n",
    ));
    assert!(out.contains("Added material: Rebar (ID: 1)"));
    assert!(out.contains("Unit: ton"));
    assert!(out.contains("Cost per unit: $1,200.00"));
    assert!(out.contains("Supplier: SteelWorks"));
}

#[test]
fn order_without_supplier_is_refused() {
    let site = Site::new();
    assert_ok(&site.run(&["materials", "add", "Sand", "--unit", "m3"]));

    let out = assert_ok(&site.run(&[
        "materials",
        "order",
        "--material-id",
        "1",
        "--quantity",
        "5",
    ]));
    assert!(out.contains("Failed to create order: no supplier specified"));

    let out = assert_ok(&site.run(&["materials", "orders"]));
    assert!(out.contains("No orders found."));
}

#[test]
fn order_with_explicit_supplier_and_status_change() {
    let site = Site::new();
    assert_ok(&site.run(&["materials", "add", "Sand", "--unit", "m3"]));
    let out = assert_ok(&site.run(&[
        "materials",
        "suppliers",
        "add",
        "Quarry Ltd",
        "--contact",
        "555-0100",
    ]));
    assert!(out.contains("Added supplier: Quarry Ltd (ID: 1)"));

    let out = assert_ok(&site.run(&[
        "materials",
        "order",
        "--material-id",
        "1",
        "--quantity",
        "5",
        "--supplier-id",
        "1",
        "--delivery-date",
        "2024-07-15",
    ]));
    assert!(out.contains("Supplier: Quarry Ltd"));
    assert!(out.contains("Total Cost: N/A"));
    assert!(out.contains("Delivery Date: 2024-07-15"));

    let out = assert_ok(&site.run(&[
        "materials",
        "order-status",
        "--order-id",
        "1",
        "--status",
        "delivered",
    ]));
    assert!(out.contains("Order 1 status set to delivered"));

    let out = assert_ok(&site.run(&["materials", "orders"]));
    assert!(out.contains("1. Sand - 5 m3 - Quarry Ltd - N/A - delivered - Delivery: 2024-07-15"));
}

#[test]
fn invalid_required_quantity_is_reported() {
    let site = Site::new();
    assert_ok(&site.run(&["materials", "add", "Sand", "--unit", "m3", "--supplier", "Q"]));
    let out = assert_ok(&site.run(&[
        "materials",
        "order",
        "--material-id",
        "1",
        "--quantity",
        "0",
    ]));
    assert!(out.contains("Invalid quantity"));
}

#[test]
fn stock_and_inventory_views() {
    let site = Site::new();
    assert_ok(&site.run(&["materials", "add", "Cement", "--unit", "bag"]));
    assert_ok(&site.run(&["materials", "add", "Gravel", "--unit", "ton"]));
    assert_ok(&site.run(&["materials", "add", "Tile", "--unit", "box"]));

    let out = assert_ok(&site.run(&[
        "materials",
        "stock",
        "--material-id",
        "1",
        "--quantity",
        "8",
    ]));
    assert!(out.contains("Updated stock for Cement: 8 bag at warehouse"));
    assert_ok(&site.run(&[
        "materials",
        "stock",
        "--material-id",
        "2",
        "--quantity",
        "15",
        "--location",
        "Yard B",
    ]));

    let out = assert_ok(&site.run(&["materials", "inventory"]));
    assert!(out.contains("Inventory Status:"));
    assert!(out.contains("Cement: 8 bag - Location: warehouse"));
    assert!(out.contains("Gravel: 15 ton - Location: Yard B"));
    assert!(out.contains("Tile: 0 box - Location: N/A"));

    let out = assert_ok(&site.run(&["materials", "inventory", "--low-stock"]));
    assert!(out.contains("Low Stock Items (≤ 10):"));
    assert!(out.contains("Cement: 8 bag"));
    assert!(!out.contains("Gravel"));
    assert!(!out.contains("Tile"));

    let out = assert_ok(&site.run(&["materials", "inventory", "--threshold", "20"]));
    assert!(out.contains("Gravel: 15 ton"));
}

#[test]
fn inventory_threshold_must_be_a_number() {
    let site = Site::new();
    assert_ok(&site.run(&["materials", "add", "Cement", "--unit", "bag"]));

    for bad in ["NaN", "inf", "lots"] {
        let out = site.run(&["materials", "inventory", "--threshold", bad]);
        assert!(!out.status.success(), "threshold {bad} was accepted");
        assert!(stderr(&out).contains("error: invalid --threshold"));
        assert!(!stdout(&out).contains("Low Stock Items"));
    }
}

#[test]
fn config_file_sets_defaults() {
    let site = Site::new();
    fs::write(
        site.dir.path().join("buildcli.yaml"),
        "default_location: Shed 2\nlow_stock_threshold: 3\n",
    )
    .unwrap();
    assert_ok(&site.run(&["materials", "add", "Cement", "--unit", "bag"]));

    let out = assert_ok(&site.run(&[
        "materials",
        "stock",
        "--material-id",
        "1",
        "--quantity",
        "5",
    ]));
    assert!(out.contains("at Shed 2"));

    let out = assert_ok(&site.run(&["materials", "inventory", "--low-stock"]));
    assert!(out.contains("No materials at or below 3."));
}

#[test]
fn bad_config_file_fails() {
    let site = Site::new();
    let config = site.dir.path().join("broken.yaml");
    fs::write(&config, "low_stock_threshold: -4\n").unwrap();

    let output = site.run(&["--config", config.to_str().unwrap(), "project", "list"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: invalid config"));
}

#[test]
fn delete_material_policies() {
    let site = Site::new();
    assert_ok(&site.run(&["materials", "add", "Cement", "--unit", "bag", "--supplier", "AcmeCo"]));
    assert_ok(&site.run(&["materials", "add", "Lime", "--unit", "bag"]));
    assert_ok(&site.run(&[
        "materials",
        "order",
        "--material-id",
        "1",
        "--quantity",
        "2",
    ]));

    let out = assert_ok(&site.run(&["materials", "delete", "--material-id", "1", "--yes"]));
    assert!(out.contains("Failed to delete material:"));

    let out = assert_ok(&site.run_with_input(&["materials", "delete", "--material-id", "2"], "n\n"));
    assert!(out.contains("Deletion cancelled."));

    let out = assert_ok(&site.run_with_input(&["materials", "delete", "--material-id", "2"], "y\n"));
    assert!(out.contains("Material 'Lime' deleted successfully."));

    let out = assert_ok(&site.run(&["materials", "list"]));
    assert!(out.contains("1. Cement"));
    assert!(!out.contains("Lime"));

    let out = assert_ok(&site.run(&["materials", "delete", "--material-id", "7", "--yes"]));
    assert!(out.contains("Material not found"));
}

// ---------------------------------------------------------------------------
// Database commands
// ---------------------------------------------------------------------------

#[test]
fn db_init_and_status() {
    let site = Site::new();
    let out = assert_ok(&site.run(&["db", "init"]));
    assert!(out.contains("Database initialized at"));

    assert_ok(&site.run(&["project", "create", "Riverside"]));
    assert_ok(&site.run(&["materials", "add", "Cement", "--unit", "bag", "--supplier", "AcmeCo"]));

    let out = assert_ok(&site.run(&["db", "status"]));
    assert!(out.contains("Database Status:"));
    assert!(out.contains("Tables: present"));
    assert!(out.contains("Projects: 1"));
    assert!(out.contains("Materials: 1"));
    assert!(out.contains("Suppliers: 1"));
    assert!(out.contains("Orders: 0"));
}
