//! MindFlow CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use tracing::info;

use mindflow::cli::{Cli, Command, SubtaskCommand};
use mindflow::config::Config;
use mindflow::domain::{Category, IdResolver, Priority, Task, TaskDraft, TaskId, UuidGenerator, short_id};
use mindflow::filter::{CategoryFilter, CompletionFilter, filter};
use mindflow::llm::create_client;
use mindflow::persistence::TaskSlot;
use mindflow::planning::PlanningClient;
use mindflow::prompts::PromptLoader;
use mindflow::stats::Summary;
use mindflow::store::TaskStore;
use mindflow::workspace::{BreakdownOutcome, Workspace};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mindflow")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("mindflow.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(store) = cli.store {
        config.storage.store_dir = store;
    }

    info!(
        "MindFlow loaded config: provider={}, model={}, store={}",
        config.llm.provider,
        config.llm.model,
        config.storage.store_dir.display()
    );

    let mut workspace = open_workspace(&config)?;

    match cli.command {
        Command::Add {
            title,
            desc,
            priority,
            category,
            suggest_priority,
        } => cmd_add(&mut workspace, title, desc, priority, category, suggest_priority).await,
        Command::List { filter, category } => cmd_list(&workspace, filter, category),
        Command::Show { id } => cmd_show(&workspace, &id),
        Command::Toggle { id } => cmd_toggle(&mut workspace, &id),
        Command::Delete { id } => cmd_delete(&mut workspace, &id),
        Command::Subtask { command } => match command {
            SubtaskCommand::Toggle { task, subtask } => cmd_subtask_toggle(&mut workspace, &task, &subtask),
        },
        Command::Plan { goal } => cmd_plan(&mut workspace, &goal.join(" ")).await,
        Command::Breakdown { ids } => cmd_breakdown(&mut workspace, &ids).await,
        Command::Stats => cmd_stats(&workspace),
    }
}

/// Wire the store and planning client together from config
fn open_workspace(config: &Config) -> Result<Workspace> {
    let kv = kvstore::FileStore::open(&config.storage.store_dir)
        .with_context(|| format!("Failed to open task store at {}", config.storage.store_dir.display()))?;
    let store = TaskStore::open(TaskSlot::new(Arc::new(kv)), Arc::new(UuidGenerator));

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let root = std::env::current_dir().context("Failed to get current directory")?;
    let planner = PlanningClient::new(llm, PromptLoader::new(root));

    Ok(Workspace::new(store, planner))
}

/// Resolve a full or partial task id
fn resolve_task(workspace: &Workspace, reference: &str) -> Result<TaskId> {
    match workspace.store().resolve_id(reference) {
        Ok(Some(id)) => Ok(id),
        Ok(None) => bail!("No task matches '{}'", reference),
        Err(candidates) => {
            let shorts: Vec<&str> = candidates.iter().map(|c| short_id(c)).collect();
            bail!("'{}' is ambiguous: {}", reference, shorts.join(", "))
        }
    }
}

async fn cmd_add(
    workspace: &mut Workspace,
    title: String,
    desc: Option<String>,
    priority: Priority,
    category: Category,
    suggest_priority: bool,
) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Task title must not be empty");
    }
    if suggest_priority && !workspace.planner().is_available() {
        println!("{} No API key configured; using default priority", "!".yellow());
    }

    let mut draft = TaskDraft::new(title).with_priority(priority).with_category(category);
    if let Some(desc) = desc {
        draft = draft.with_description(desc);
    }

    let task = workspace
        .add_task(draft, suggest_priority)
        .await
        .context("Failed to add task")?;
    println!("{} Added task {} {}", "✓".green(), short_id(&task.id).cyan(), task.title);
    print_badges(&task);
    Ok(())
}

fn cmd_list(workspace: &Workspace, completion: CompletionFilter, category: CategoryFilter) -> Result<()> {
    let tasks = filter(workspace.store().tasks(), completion, category);
    if tasks.is_empty() {
        println!("No tasks found");
        return Ok(());
    }

    for task in tasks {
        print_task_line(task);
    }
    Ok(())
}

fn cmd_show(workspace: &Workspace, reference: &str) -> Result<()> {
    let id = resolve_task(workspace, reference)?;
    let Some(task) = workspace.store().get(&id) else {
        bail!("No task matches '{}'", reference);
    };

    print_task_line(task);
    println!("  {} {}", "id:".dimmed(), task.id);
    println!("  {} {}", "created:".dimmed(), format_created(task.created_at));
    if let Some(desc) = &task.description {
        println!("  {}", desc);
    }
    for subtask in &task.subtasks {
        let mark = if subtask.completed { "[x]".green() } else { "[ ]".normal() };
        let title = if subtask.completed {
            subtask.title.strikethrough().dimmed()
        } else {
            subtask.title.normal()
        };
        println!("    {} {} {}", mark, short_id(&subtask.id).dimmed(), title);
    }
    Ok(())
}

fn cmd_toggle(workspace: &mut Workspace, reference: &str) -> Result<()> {
    let id = resolve_task(workspace, reference)?;
    workspace
        .store_mut()
        .toggle_completion(&id)
        .context("Failed to save tasks")?;

    if let Some(task) = workspace.store().get(&id) {
        let state = if task.completed { "completed".green() } else { "active".yellow() };
        println!("{} {} is now {}", "✓".green(), task.title, state);
    }
    Ok(())
}

fn cmd_delete(workspace: &mut Workspace, reference: &str) -> Result<()> {
    let id = resolve_task(workspace, reference)?;
    let removed = workspace.store_mut().remove(&id).context("Failed to save tasks")?;
    if let Some(task) = removed {
        println!("{} Deleted task: {}", "✓".green(), task.title);
    }
    Ok(())
}

fn cmd_subtask_toggle(workspace: &mut Workspace, task_ref: &str, subtask_ref: &str) -> Result<()> {
    let task_id = resolve_task(workspace, task_ref)?;
    let subtask_id = {
        let Some(task) = workspace.store().get(&task_id) else {
            bail!("No task matches '{}'", task_ref);
        };
        match IdResolver::new(task.subtasks.iter().map(|s| s.id.as_str())).resolve(subtask_ref) {
            Ok(Some(id)) => id.to_string(),
            Ok(None) => bail!("No subtask matches '{}'", subtask_ref),
            Err(candidates) => bail!("'{}' is ambiguous: {}", subtask_ref, candidates.join(", ")),
        }
    };

    workspace
        .store_mut()
        .toggle_subtask(&task_id, &subtask_id)
        .context("Failed to save tasks")?;

    if let Some(subtask) = workspace.store().get(&task_id).and_then(|t| t.subtask(&subtask_id)) {
        let state = if subtask.completed { "done".green() } else { "open".yellow() };
        println!("{} {} is now {}", "✓".green(), subtask.title, state);
    }
    Ok(())
}

async fn cmd_plan(workspace: &mut Workspace, goal: &str) -> Result<()> {
    if goal.trim().is_empty() {
        bail!("Goal must not be empty");
    }

    println!("{} Planning: {}", "…".cyan(), goal);
    let ids = workspace
        .plan_goal(goal)
        .await
        .context("Failed to generate plan. Please check your API key or try again")?;

    println!("{} Added {} tasks", "✓".green(), ids.len());
    for id in &ids {
        if let Some(task) = workspace.store().get(id) {
            print_task_line(task);
        }
    }
    Ok(())
}

async fn cmd_breakdown(workspace: &mut Workspace, references: &[String]) -> Result<()> {
    if !workspace.planner().is_available() {
        println!("{} No API key configured; no suggestions available", "!".yellow());
    }

    let mut ids = Vec::with_capacity(references.len());
    for reference in references {
        ids.push(resolve_task(workspace, reference)?);
    }

    let outcomes = workspace.breakdown(&ids).await.context("Failed to save tasks")?;
    for outcome in outcomes {
        match outcome {
            BreakdownOutcome::Added { task_id, count } => {
                let title = workspace.store().get(&task_id).map(|t| t.title.as_str()).unwrap_or("");
                if count == 0 {
                    println!("{} {} no suggestions", "-".dimmed(), title);
                } else {
                    println!("{} {} +{} subtasks", "✓".green(), title, count);
                }
            }
            BreakdownOutcome::Missing { task_id } => {
                println!("{} {} not found", "✗".red(), short_id(&task_id));
            }
            BreakdownOutcome::Busy { task_id } => {
                println!("{} {} already in progress", "-".dimmed(), short_id(&task_id));
            }
        }
    }
    Ok(())
}

fn cmd_stats(workspace: &Workspace) -> Result<()> {
    let summary = Summary::from_tasks(workspace.store().tasks());

    println!("Tasks: {}", summary.total);
    println!("  Completed: {}", summary.completed.to_string().green());
    println!("  Active: {}", summary.active.to_string().yellow());
    println!("  Completion: {:.0}%", summary.completion_rate() * 100.0);

    if !summary.active_by_priority.is_empty() {
        println!("Active by priority:");
        for (priority, count) in &summary.active_by_priority {
            println!("  {:<8} {}", priority_badge(*priority), count);
        }
    }

    let categories: Vec<_> = summary.by_category.iter().filter(|(_, n)| *n > 0).collect();
    if !categories.is_empty() {
        println!("By category:");
        for (category, count) in categories {
            println!("  {:<10} {}", category.to_string().blue(), count);
        }
    }
    Ok(())
}

fn print_task_line(task: &Task) {
    let mark = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let title = if task.completed {
        task.title.strikethrough().dimmed()
    } else {
        task.title.bold()
    };

    let (done, total) = task.subtask_progress();
    let progress = if total > 0 {
        format!(" {}/{}", done, total).dimmed().to_string()
    } else {
        String::new()
    };

    println!(
        "{} {} {} {} {}{}",
        mark,
        short_id(&task.id).dimmed(),
        priority_badge(task.priority),
        category_badge(task.category),
        title,
        progress
    );
}

fn print_badges(task: &Task) {
    println!("  {} {}", priority_badge(task.priority), category_badge(task.category));
}

fn priority_badge(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.as_str().red(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().green(),
    }
}

fn category_badge(category: Category) -> ColoredString {
    let label = format!("#{}", category.as_str());
    match category {
        Category::Work => label.blue(),
        Category::Personal => label.magenta(),
        Category::Health => label.green(),
        Category::Learning => label.cyan(),
        Category::General => label.normal(),
    }
}

fn format_created(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}
