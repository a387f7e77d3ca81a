use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    filter::task_counts, load_settings, HttpTodoClient, InlineEdit, ReconcileMode, SyncOutcome,
    TaskIntent, TaskListController, TodoApi,
};
use shared::domain::{Task, TaskFilter, TaskId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Command-line client for a todos service")]
struct Args {
    /// Base url of the service. Overrides todo.toml and APP__API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Re-fetch the whole list after each change instead of mirroring it.
    #[arg(long, global = true)]
    refetch: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Show tasks.
    List {
        #[arg(long, short, default_value = "all")]
        filter: TaskFilter,
    },
    /// Add a task.
    Add {
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Flip a task between active and completed.
    Toggle { id: TaskId },
    /// Give a task a new title.
    Rename {
        id: TaskId,
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Remove a task.
    Delete { id: TaskId },
    /// Print the service banner.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    if args.refetch {
        settings.reconcile = ReconcileMode::Refetch;
    }

    let client = HttpTodoClient::new(&settings)?;
    tracing::debug!(base_url = %client.base_url(), reconcile = %settings.reconcile, "starting");
    let mut controller = TaskListController::with_reconcile(client, settings.reconcile);
    let mut stdout = std::io::stdout().lock();
    run(args.command, &mut controller, &mut stdout).await
}

async fn run<A: TodoApi, W: Write>(
    command: Command,
    controller: &mut TaskListController<A>,
    out: &mut W,
) -> Result<()> {
    if command == Command::Status {
        let status = controller.api().service_status().await?;
        writeln!(out, "{}", status.message)?;
        return Ok(());
    }

    let outcome = controller.load().await;
    ensure_applied(controller, outcome)?;

    let mut filter = TaskFilter::All;
    match command {
        Command::List { filter: requested } => filter = requested,
        Command::Add { title } => {
            let title = title.join(" ");
            match controller.create(&title).await {
                SyncOutcome::Skipped => bail!("title must not be empty"),
                outcome => ensure_applied(controller, outcome)?,
            }
        }
        Command::Toggle { id } => {
            let intent = TaskIntent::toggle(find_task(controller, id)?);
            let outcome = controller.dispatch(intent).await;
            ensure_applied(controller, outcome)?;
        }
        Command::Rename { id, title } => {
            let task = find_task(controller, id)?.clone();
            let mut edit = InlineEdit::default();
            edit.begin(&task);
            if let Some(draft) = edit.draft_mut(id) {
                *draft = title.join(" ");
            }
            match edit.commit(&task) {
                Some(intent) => {
                    let outcome = controller.dispatch(intent).await;
                    ensure_applied(controller, outcome)?;
                }
                None => writeln!(out, "Task {id} unchanged.")?,
            }
        }
        Command::Delete { id } => {
            find_task(controller, id)?;
            let outcome = controller.remove(id).await;
            ensure_applied(controller, outcome)?;
        }
        Command::Status => {}
    }

    let tasks = controller.list().tasks();
    write!(out, "{}", render_tasks(&controller.list().visible(filter), tasks))?;
    Ok(())
}

fn ensure_applied<A: TodoApi>(
    controller: &TaskListController<A>,
    outcome: SyncOutcome,
) -> Result<()> {
    if outcome.is_failed() {
        let message = controller.list().error().unwrap_or("request failed");
        bail!("{message}");
    }
    Ok(())
}

fn find_task<A: TodoApi>(controller: &TaskListController<A>, id: TaskId) -> Result<&Task> {
    controller
        .list()
        .get(id)
        .with_context(|| format!("no task with id {id}"))
}

fn render_tasks(visible: &[&Task], all: &[Task]) -> String {
    let mut rendered = String::new();
    if visible.is_empty() {
        rendered.push_str("No tasks.\n");
    }
    let width = visible
        .iter()
        .map(|task| task.id.to_string().len())
        .max()
        .unwrap_or(1);
    for task in visible {
        let mark = if task.completed { 'x' } else { ' ' };
        rendered.push_str(&format!(
            "[{mark}] {:>width$}  {}\n",
            task.id.to_string(),
            task.title
        ));
    }
    let (active, completed) = task_counts(all);
    rendered.push_str(&format!("{active} active, {completed} completed\n"));
    rendered
}
