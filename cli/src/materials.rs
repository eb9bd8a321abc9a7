//! `materials` commands: materials, suppliers, inventory, and orders.

use clap::{Args, Subcommand};
use construction_core::{
    NewMaterial, NewOrder, RecordId, parse_amount, parse_date, parse_id, parse_quantity,
    parse_stock_level,
};
use construction_sqlite::MaterialService;

use crate::format::{currency, currency_or_na, date_or, quantity, text_or_na};
use crate::{
    Context, input_error, optional_field, optional_flag, plain_text, required_field, settle,
};

#[derive(Debug, Args)]
pub(crate) struct MaterialsArgs {
    #[command(subcommand)]
    operation: MaterialsOperation,
}

#[derive(Debug, Subcommand)]
enum MaterialsOperation {
    /// Add a material (prompts for anything not given).
    Add(AddArgs),
    /// List materials.
    List,
    /// Show stock levels.
    Inventory(InventoryArgs),
    /// Set a material's stock level.
    Stock(StockArgs),
    /// Manage suppliers.
    Suppliers(SuppliersArgs),
    /// Place an order for a material.
    Order(OrderArgs),
    /// List orders.
    Orders,
    /// Change an order's status.
    OrderStatus(OrderStatusArgs),
    /// Delete a material that no order references.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Material name.
    name: Option<String>,
    /// Unit of measurement (e.g. bag, m3, ton).
    #[arg(long)]
    unit: Option<String>,
    /// Cost per unit in dollars.
    #[arg(long)]
    cost_per_unit: Option<String>,
    /// Default supplier name; created if it does not exist.
    #[arg(long)]
    supplier: Option<String>,
}

#[derive(Debug, Args)]
struct InventoryArgs {
    /// Only show materials at or below the low-stock threshold.
    #[arg(long)]
    low_stock: bool,
    /// Low-stock threshold (implies --low-stock).
    #[arg(long)]
    threshold: Option<String>,
}

#[derive(Debug, Args)]
struct StockArgs {
    #[arg(long)]
    material_id: Option<RecordId>,
    /// New on-hand quantity.
    #[arg(long)]
    quantity: Option<String>,
    /// Stock location (default from config).
    #[arg(long)]
    location: Option<String>,
}

#[derive(Debug, Args)]
struct SuppliersArgs {
    #[command(subcommand)]
    operation: SupplierOperation,
}

#[derive(Debug, Subcommand)]
enum SupplierOperation {
    /// Add a supplier.
    Add(SupplierAddArgs),
    /// List suppliers.
    List,
}

#[derive(Debug, Args)]
struct SupplierAddArgs {
    /// Supplier name.
    name: Option<String>,
    /// Contact details.
    #[arg(long)]
    contact: Option<String>,
}

#[derive(Debug, Args)]
struct OrderArgs {
    #[arg(long)]
    material_id: Option<RecordId>,
    #[arg(long)]
    quantity: Option<String>,
    /// Supplier to order from (default: the material's supplier).
    #[arg(long)]
    supplier_id: Option<RecordId>,
    /// Expected delivery date (YYYY-MM-DD).
    #[arg(long)]
    delivery_date: Option<String>,
}

#[derive(Debug, Args)]
struct OrderStatusArgs {
    #[arg(long)]
    order_id: RecordId,
    /// New status (e.g. delivered, cancelled).
    #[arg(long)]
    status: String,
    /// Delivery date (YYYY-MM-DD).
    #[arg(long)]
    delivery_date: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    #[arg(long)]
    material_id: Option<RecordId>,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

pub(crate) fn run_materials(args: MaterialsArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    match args.operation {
        MaterialsOperation::Add(args) => run_add(args, ctx),
        MaterialsOperation::List => run_list(ctx),
        MaterialsOperation::Inventory(args) => run_inventory(args, ctx),
        MaterialsOperation::Stock(args) => run_stock(args, ctx),
        MaterialsOperation::Suppliers(args) => match args.operation {
            SupplierOperation::Add(args) => run_supplier_add(args, ctx),
            SupplierOperation::List => run_supplier_list(ctx),
        },
        MaterialsOperation::Order(args) => run_order(args, ctx),
        MaterialsOperation::Orders => run_orders(ctx),
        MaterialsOperation::OrderStatus(args) => run_order_status(args, ctx),
        MaterialsOperation::Delete(args) => run_delete(args, ctx),
    }
}

fn run_add(args: AddArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let interactive = args.name.is_none() || args.unit.is_none();
    let p = &mut ctx.prompter;
    let name = match args.name {
        Some(name) => name,
        None => p.text("Material name").map_err(input_error)?,
    };
    let unit = match args.unit {
        Some(unit) => unit,
        None => p.text("Unit of measurement").map_err(input_error)?,
    };
    let cost_per_unit = optional_field(
        p,
        interactive,
        "Cost per unit",
        args.cost_per_unit.as_deref(),
        parse_amount,
    )?;
    let supplier_name = optional_field(
        p,
        interactive,
        "Supplier name",
        args.supplier.as_deref(),
        plain_text,
    )?;
    let input = NewMaterial {
        name,
        unit,
        cost_per_unit,
        supplier_name,
    };

    let service = MaterialService::new(ctx.store);
    let Some(material) = settle(service.add_material(&input), "add material")? else {
        return Ok(());
    };

    println!("Added material: {} (ID: {})", material.name, material.id);
    println!("Unit: {}", material.unit);
    if let Some(cost) = material.cost_per_unit {
        println!("Cost per unit: {}", currency(cost, 2));
    }
    if let Some(supplier_id) = material.supplier_id {
        let supplier = settle(service.get_supplier(supplier_id), "load supplier")?.flatten();
        if let Some(supplier) = supplier {
            println!("Supplier: {}", supplier.name);
        }
    }
    Ok(())
}

fn run_list(ctx: &mut Context<'_>) -> Result<(), String> {
    let service = MaterialService::new(ctx.store);
    let Some(materials) = settle(service.list_materials(), "list materials")? else {
        return Ok(());
    };

    if materials.is_empty() {
        println!("No materials found.");
        return Ok(());
    }
    println!("Materials List:");
    for material in &materials {
        println!(
            "{}. {} - {} - {}",
            material.id,
            material.name,
            material.unit,
            currency_or_na(material.cost_per_unit, 2)
        );
    }
    Ok(())
}

fn run_inventory(args: InventoryArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let threshold = match (args.threshold, args.low_stock) {
        (Some(raw), _) => {
            let level =
                parse_stock_level(&raw).map_err(|err| format!("invalid --threshold: {err}"))?;
            Some(level)
        }
        (None, true) => Some(ctx.config.low_stock_threshold),
        (None, false) => None,
    };

    let service = MaterialService::new(ctx.store);
    let Some(entries) = settle(service.get_inventory(threshold), "load inventory")? else {
        return Ok(());
    };

    match threshold {
        Some(t) if entries.is_empty() => {
            println!("No materials at or below {}.", quantity(t));
            return Ok(());
        }
        Some(t) => println!("Low Stock Items (≤ {}):", quantity(t)),
        None if entries.is_empty() => {
            println!("No materials found.");
            return Ok(());
        }
        None => println!("Inventory Status:"),
    }
    for entry in &entries {
        println!(
            "{}: {} {} - Location: {}",
            entry.material.name,
            quantity(entry.quantity()),
            entry.material.unit,
            text_or_na(entry.location())
        );
    }
    Ok(())
}

fn run_stock(args: StockArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let interactive = args.material_id.is_none() || args.quantity.is_none();
    let Some(material_id) = args
        .material_id
        .map_or_else(|| select_material(ctx), |id| Ok(Some(id)))?
    else {
        return Ok(());
    };
    let p = &mut ctx.prompter;
    let Some(amount) = required_field(p, "Quantity", args.quantity.as_deref(), parse_stock_level)?
    else {
        return Ok(());
    };
    let location = match args.location {
        Some(location) => Some(location),
        None if interactive => p
            .optional_text(&format!("Location [{}]", ctx.config.default_location))
            .map_err(input_error)?,
        None => None,
    };
    let location = location
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| ctx.config.default_location.clone());

    let service = MaterialService::new(ctx.store);
    let Some(material) = settle(service.get_material(material_id), "load material")?.flatten()
    else {
        println!("Material not found");
        return Ok(());
    };
    let Some(stock) = settle(
        service.update_stock(material_id, amount, Some(&location)),
        "update stock",
    )?
    else {
        return Ok(());
    };

    println!(
        "Updated stock for {}: {} {} at {}",
        material.name,
        quantity(stock.quantity),
        material.unit,
        stock.location
    );
    Ok(())
}

fn run_supplier_add(args: SupplierAddArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let interactive = args.name.is_none();
    let p = &mut ctx.prompter;
    let name = match args.name {
        Some(name) => name,
        None => p.text("Supplier name").map_err(input_error)?,
    };
    let contact = match args.contact {
        Some(contact) => Some(contact),
        None if interactive => p.optional_text("Contact").map_err(input_error)?,
        None => None,
    };

    let service = MaterialService::new(ctx.store);
    let Some(supplier) = settle(
        service.add_supplier(&name, contact.as_deref()),
        "add supplier",
    )?
    else {
        return Ok(());
    };

    println!("Added supplier: {} (ID: {})", supplier.name, supplier.id);
    if let Some(contact) = &supplier.contact {
        println!("Contact: {contact}");
    }
    Ok(())
}

fn run_supplier_list(ctx: &mut Context<'_>) -> Result<(), String> {
    let service = MaterialService::new(ctx.store);
    let Some(suppliers) = settle(service.list_suppliers(), "list suppliers")? else {
        return Ok(());
    };

    if suppliers.is_empty() {
        println!("No suppliers found.");
        return Ok(());
    }
    println!("Suppliers List:");
    for supplier in &suppliers {
        println!(
            "{}. {} - {}",
            supplier.id,
            supplier.name,
            text_or_na(supplier.contact.as_deref())
        );
    }
    Ok(())
}

fn run_order(args: OrderArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let interactive = args.material_id.is_none() || args.quantity.is_none();
    let Some(material_id) = args
        .material_id
        .map_or_else(|| select_material(ctx), |id| Ok(Some(id)))?
    else {
        return Ok(());
    };
    let p = &mut ctx.prompter;
    let Some(amount) = required_field(p, "Quantity", args.quantity.as_deref(), parse_quantity)?
    else {
        return Ok(());
    };
    let supplier_id = match args.supplier_id {
        Some(id) => Some(id),
        None if interactive => p
            .optional("Supplier ID (blank for the material's supplier)", parse_id)
            .map_err(input_error)?,
        None => None,
    };
    let delivery_date = optional_field(
        p,
        interactive,
        "Delivery date (YYYY-MM-DD)",
        args.delivery_date.as_deref(),
        parse_date,
    )?;
    let input = NewOrder {
        material_id,
        quantity: amount,
        supplier_id,
        delivery_date,
    };

    let service = MaterialService::new(ctx.store);
    let Some(detail) = settle(service.create_order(&input), "create order")? else {
        return Ok(());
    };

    println!("Order created (ID: {})", detail.order.id);
    println!("Material: {}", detail.material.name);
    println!(
        "Quantity: {} {}",
        quantity(detail.order.quantity),
        detail.material.unit
    );
    println!("Supplier: {}", detail.supplier.name);
    println!("Total Cost: {}", currency_or_na(detail.total_cost(), 2));
    println!("Delivery Date: {}", date_or(detail.order.delivery_date, "TBD"));
    Ok(())
}

fn run_orders(ctx: &mut Context<'_>) -> Result<(), String> {
    let service = MaterialService::new(ctx.store);
    let Some(orders) = settle(service.list_orders(), "list orders")? else {
        return Ok(());
    };

    if orders.is_empty() {
        println!("No orders found.");
        return Ok(());
    }
    println!("Orders List:");
    for detail in &orders {
        println!(
            "{}. {} - {} {} - {} - {} - {} - Delivery: {}",
            detail.order.id,
            detail.material.name,
            quantity(detail.order.quantity),
            detail.material.unit,
            detail.supplier.name,
            currency_or_na(detail.total_cost(), 2),
            detail.order.status,
            date_or(detail.order.delivery_date, "TBD")
        );
    }
    Ok(())
}

fn run_order_status(args: OrderStatusArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let delivery_date = optional_flag("delivery date", args.delivery_date.as_deref(), parse_date);

    let service = MaterialService::new(ctx.store);
    let Some(detail) = settle(
        service.update_order_status(args.order_id, &args.status, delivery_date),
        "update order",
    )?
    else {
        return Ok(());
    };

    println!("Order {} status set to {}", detail.order.id, detail.order.status);
    if let Some(date) = detail.order.delivery_date {
        println!("Delivery Date: {date}");
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let Some(material_id) = args
        .material_id
        .map_or_else(|| select_material(ctx), |id| Ok(Some(id)))?
    else {
        return Ok(());
    };

    let service = MaterialService::new(ctx.store);
    let Some(material) = settle(service.get_material(material_id), "load material")?.flatten()
    else {
        println!("Material not found");
        return Ok(());
    };

    if !args.yes {
        let confirmed = ctx
            .prompter
            .confirm(&format!("Delete material '{}'?", material.name))
            .map_err(input_error)?;
        if !confirmed {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    if let Some(deleted) = settle(service.delete_material(material.id), "delete material")? {
        println!("Material '{}' deleted successfully.", deleted.name);
    }
    Ok(())
}

/// Lists materials and asks for one by id. Returns `None` when there is
/// nothing to choose from.
fn select_material(ctx: &mut Context<'_>) -> Result<Option<RecordId>, String> {
    let service = MaterialService::new(ctx.store);
    let Some(materials) = settle(service.list_materials(), "list materials")? else {
        return Ok(None);
    };
    if materials.is_empty() {
        println!("No materials found. Add one with `buildcli materials add`.");
        return Ok(None);
    }

    println!("Available materials:");
    for material in &materials {
        println!("{}. {} ({})", material.id, material.name, material.unit);
    }
    let id = ctx
        .prompter
        .required("Material ID", parse_id)
        .map_err(input_error)?;
    Ok(Some(id))
}
