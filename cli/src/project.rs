//! `project` commands: projects, phases, and milestones.

use clap::{Args, Subcommand};
use construction_core::{
    DATE_FORMAT, NewProject, Project, ProjectUpdate, RecordId, parse_amount, parse_date,
    parse_days, parse_id,
};
use construction_sqlite::ProjectService;

use crate::format::{NOT_AVAILABLE, currency, currency_or_na, date_or, text_or_na};
use crate::{Context, input_error, optional_field, optional_flag, plain_text, settle};

#[derive(Debug, Args)]
pub(crate) struct ProjectArgs {
    #[command(subcommand)]
    operation: ProjectOperation,
}

#[derive(Debug, Subcommand)]
enum ProjectOperation {
    /// Create a project (prompts for anything not given).
    Create(CreateArgs),
    /// List projects.
    List(ListArgs),
    /// Show one project.
    Status(StatusArgs),
    /// Change fields of a project.
    Update(UpdateArgs),
    /// Manage project phases.
    Phases(PhasesArgs),
    /// Manage project milestones.
    Milestones(MilestonesArgs),
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Project name.
    name: Option<String>,
    /// Budget in dollars.
    #[arg(long)]
    budget: Option<String>,
    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start_date: Option<String>,
    /// Site location.
    #[arg(long)]
    location: Option<String>,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only list projects with this status.
    #[arg(long)]
    status: Option<String>,
}

#[derive(Debug, Args)]
struct StatusArgs {
    #[arg(long)]
    project_id: RecordId,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[arg(long)]
    project_id: RecordId,
    #[arg(long)]
    name: Option<String>,
    /// Budget in dollars.
    #[arg(long)]
    budget: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start_date: Option<String>,
    /// End date (YYYY-MM-DD).
    #[arg(long)]
    end_date: Option<String>,
}

#[derive(Debug, Args)]
struct PhasesArgs {
    #[command(subcommand)]
    operation: PhaseOperation,
}

#[derive(Debug, Subcommand)]
enum PhaseOperation {
    /// Add a phase to a project.
    Add(PhaseAddArgs),
    /// List a project's phases.
    List(PhaseListArgs),
}

#[derive(Debug, Args)]
struct PhaseAddArgs {
    #[arg(long)]
    project_id: Option<RecordId>,
    #[arg(long)]
    name: Option<String>,
    /// Planned duration in days.
    #[arg(long)]
    duration: Option<String>,
    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start_date: Option<String>,
}

#[derive(Debug, Args)]
struct PhaseListArgs {
    #[arg(long)]
    project_id: RecordId,
}

#[derive(Debug, Args)]
struct MilestonesArgs {
    #[command(subcommand)]
    operation: MilestoneOperation,
}

#[derive(Debug, Subcommand)]
enum MilestoneOperation {
    /// Add a milestone to a project.
    Add(MilestoneAddArgs),
    /// List a project's milestones.
    List(MilestoneListArgs),
    /// Mark a milestone completed today.
    Complete(MilestoneCompleteArgs),
}

#[derive(Debug, Args)]
struct MilestoneAddArgs {
    #[arg(long)]
    project_id: Option<RecordId>,
    #[arg(long)]
    name: Option<String>,
    /// Target date (YYYY-MM-DD).
    #[arg(long)]
    target_date: Option<String>,
}

#[derive(Debug, Args)]
struct MilestoneListArgs {
    #[arg(long)]
    project_id: RecordId,
}

#[derive(Debug, Args)]
struct MilestoneCompleteArgs {
    #[arg(long)]
    milestone_id: RecordId,
}

pub(crate) fn run_project(args: ProjectArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    match args.operation {
        ProjectOperation::Create(args) => run_create(args, ctx),
        ProjectOperation::List(args) => run_list(args, ctx),
        ProjectOperation::Status(args) => run_status(args, ctx),
        ProjectOperation::Update(args) => run_update(args, ctx),
        ProjectOperation::Phases(args) => match args.operation {
            PhaseOperation::Add(args) => run_phase_add(args, ctx),
            PhaseOperation::List(args) => run_phase_list(args, ctx),
        },
        ProjectOperation::Milestones(args) => match args.operation {
            MilestoneOperation::Add(args) => run_milestone_add(args, ctx),
            MilestoneOperation::List(args) => run_milestone_list(args, ctx),
            MilestoneOperation::Complete(args) => run_milestone_complete(args, ctx),
        },
    }
}

fn run_create(args: CreateArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let interactive = args.name.is_none();
    let p = &mut ctx.prompter;
    let name = match args.name {
        Some(name) => name,
        None => p.text("Project name").map_err(input_error)?,
    };
    let budget = optional_field(p, interactive, "Budget", args.budget.as_deref(), parse_amount)?;
    let start_date = match args.start_date {
        Some(raw) => Some(raw),
        None if interactive => p
            .optional("Start date (YYYY-MM-DD)", parse_date)
            .map_err(input_error)?
            .map(|d| d.format(DATE_FORMAT).to_string()),
        None => None,
    };
    let location = optional_field(
        p,
        interactive,
        "Location",
        args.location.as_deref(),
        plain_text,
    )?;
    let input = NewProject {
        name,
        budget,
        start_date,
        location,
    };

    let service = ProjectService::new(ctx.store);
    let Some(project) = settle(service.create_project(&input), "create project")? else {
        return Ok(());
    };

    println!("Created project: {} (ID: {})", project.name, project.id);
    if let Some(budget) = project.budget {
        println!("Budget: {}", currency(budget, 2));
    }
    if let Some(date) = project.start_date {
        println!("Start Date: {}", date.format(DATE_FORMAT));
    }
    if let Some(location) = &project.location {
        println!("Location: {location}");
    }
    Ok(())
}

fn run_list(args: ListArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let service = ProjectService::new(ctx.store);
    let Some(projects) = settle(service.list_projects(args.status.as_deref()), "list projects")?
    else {
        return Ok(());
    };

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }
    println!("Project List:");
    for project in &projects {
        println!(
            "{}. {} - {} - {}",
            project.id,
            project.name,
            currency_or_na(project.budget, 0),
            project.status
        );
    }
    Ok(())
}

fn run_status(args: StatusArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let Some(project) = find_project(ctx, args.project_id)? else {
        return Ok(());
    };

    println!("Project: {}", project.name);
    println!("Status: {}", project.status);
    println!("Budget: {}", currency_or_na(project.budget, 2));
    println!("Location: {}", text_or_na(project.location.as_deref()));
    println!("Start Date: {}", date_or(project.start_date, NOT_AVAILABLE));
    if let Some(end) = project.end_date {
        println!("End Date: {}", end.format(DATE_FORMAT));
    }
    Ok(())
}

fn run_update(args: UpdateArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let update = ProjectUpdate {
        name: args.name,
        budget: optional_flag("budget", args.budget.as_deref(), parse_amount),
        status: args.status,
        location: args.location,
        start_date: optional_flag("start date", args.start_date.as_deref(), parse_date),
        end_date: optional_flag("end date", args.end_date.as_deref(), parse_date),
    };

    let service = ProjectService::new(ctx.store);
    if settle(service.update_project(args.project_id, &update), "update project")?.is_some() {
        println!("Project updated successfully");
    }
    Ok(())
}

fn run_phase_add(args: PhaseAddArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let interactive = args.project_id.is_none() || args.name.is_none();
    let Some(project_id) = args
        .project_id
        .map_or_else(|| select_project(ctx), |id| Ok(Some(id)))?
    else {
        return Ok(());
    };
    let Some(project) = find_project(ctx, project_id)? else {
        return Ok(());
    };

    let p = &mut ctx.prompter;
    let name = match args.name {
        Some(name) => name,
        None => p.text("Phase name").map_err(input_error)?,
    };
    let duration = optional_field(
        p,
        interactive,
        "Duration in days",
        args.duration.as_deref(),
        parse_days,
    )?;
    let start_date = optional_field(
        p,
        interactive,
        "Start date (YYYY-MM-DD)",
        args.start_date.as_deref(),
        parse_date,
    )?;

    let service = ProjectService::new(ctx.store);
    let Some(phase) = settle(
        service.add_phase(project_id, &name, duration, start_date),
        "add phase",
    )?
    else {
        return Ok(());
    };

    println!(
        "Added phase: {} (ID: {}) to project {}",
        phase.name, phase.id, project.name
    );
    Ok(())
}

fn run_phase_list(args: PhaseListArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let Some(project) = find_project(ctx, args.project_id)? else {
        return Ok(());
    };
    let service = ProjectService::new(ctx.store);
    let Some(phases) = settle(service.list_phases(project.id), "list phases")? else {
        return Ok(());
    };

    if phases.is_empty() {
        println!("No phases found for {}.", project.name);
        return Ok(());
    }
    println!("Phases for {}:", project.name);
    for phase in &phases {
        let duration = phase
            .duration
            .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string());
        println!("{}. {} - {} days - {}", phase.id, phase.name, duration, phase.status);
    }
    Ok(())
}

fn run_milestone_add(args: MilestoneAddArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let interactive = args.project_id.is_none() || args.name.is_none();
    let Some(project_id) = args
        .project_id
        .map_or_else(|| select_project(ctx), |id| Ok(Some(id)))?
    else {
        return Ok(());
    };
    if find_project(ctx, project_id)?.is_none() {
        return Ok(());
    }

    let p = &mut ctx.prompter;
    let name = match args.name {
        Some(name) => name,
        None => p.text("Milestone name").map_err(input_error)?,
    };
    let target_date = optional_field(
        p,
        interactive,
        "Target date (YYYY-MM-DD)",
        args.target_date.as_deref(),
        parse_date,
    )?;

    let service = ProjectService::new(ctx.store);
    let Some(milestone) = settle(
        service.add_milestone(project_id, &name, target_date),
        "add milestone",
    )?
    else {
        return Ok(());
    };

    println!("Added milestone: {} (ID: {})", milestone.name, milestone.id);
    println!("Target Date: {}", date_or(milestone.target_date, NOT_AVAILABLE));
    Ok(())
}

fn run_milestone_list(args: MilestoneListArgs, ctx: &mut Context<'_>) -> Result<(), String> {
    let Some(project) = find_project(ctx, args.project_id)? else {
        return Ok(());
    };
    let service = ProjectService::new(ctx.store);
    let Some(milestones) = settle(service.list_milestones(project.id), "list milestones")? else {
        return Ok(());
    };

    if milestones.is_empty() {
        println!("No milestones found for {}.", project.name);
        return Ok(());
    }
    println!("Milestones for {}:", project.name);
    for milestone in &milestones {
        let mut line = format!(
            "{}. {} - Target: {} - {}",
            milestone.id,
            milestone.name,
            date_or(milestone.target_date, NOT_AVAILABLE),
            milestone.status
        );
        if let Some(done) = milestone.completion_date.filter(|_| milestone.is_completed()) {
            line.push_str(&format!(" - Completed: {}", done.format(DATE_FORMAT)));
        }
        println!("{line}");
    }
    Ok(())
}

fn run_milestone_complete(
    args: MilestoneCompleteArgs,
    ctx: &mut Context<'_>,
) -> Result<(), String> {
    let service = ProjectService::new(ctx.store);
    let Some(milestone) = settle(
        service.complete_milestone(args.milestone_id),
        "complete milestone",
    )?
    else {
        return Ok(());
    };

    println!(
        "Milestone '{}' marked as completed on {}",
        milestone.name,
        date_or(milestone.completion_date, NOT_AVAILABLE)
    );
    Ok(())
}

/// Loads a project, printing `Project not found` when it is missing.
fn find_project(ctx: &Context<'_>, id: RecordId) -> Result<Option<Project>, String> {
    let service = ProjectService::new(ctx.store);
    let project = settle(service.get_project(id), "load project")?.flatten();
    if project.is_none() {
        println!("Project not found");
    }
    Ok(project)
}

/// Lists projects and asks for one by id. Returns `None` when there is
/// nothing to choose from.
fn select_project(ctx: &mut Context<'_>) -> Result<Option<RecordId>, String> {
    let service = ProjectService::new(ctx.store);
    let Some(projects) = settle(service.list_projects(None), "list projects")? else {
        return Ok(None);
    };
    if projects.is_empty() {
        println!("No projects found. Create one with `buildcli project create`.");
        return Ok(None);
    }

    println!("Available projects:");
    for project in &projects {
        println!("{}. {}", project.id, project.name);
    }
    let id = ctx
        .prompter
        .required("Project ID", parse_id)
        .map_err(input_error)?;
    Ok(Some(id))
}
