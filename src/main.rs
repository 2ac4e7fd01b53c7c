use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    services::{
        ResolveTaskError,
        files::{AddFileParameters, DeleteFileParameters, FileError, add_file, delete_file},
        subtasks::{
            AddSubtaskParameters, DeleteSubtaskParameters, SubtaskError, ToggleSubtaskParameters,
            add_subtask, delete_subtask, toggle_subtask,
        },
        tasks::{
            AddTaskError, AddTaskParameters, DeleteTaskError, UpdateTaskError,
            UpdateTaskParameters, add_task, complete_task, delete_task, reopen_task, update_task,
        },
    },
    storage::{Storage, json::JsonFileStorage},
};

mod models;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "taskdeck",
    about = "A minimal task board for your terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tasks due today (including overdue)
    Today,

    /// List tasks, grouped by category
    List {
        /// Only show tasks in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only show tasks due on this date (e.g., "2026-03-01")
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show full details for a task
    Show {
        /// Task id (or prefix) or a fragment of its title
        task: String,
    },

    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Category label (e.g., "Work")
        #[arg(short, long)]
        category: String,

        /// Due date (e.g., "2026-03-01")
        #[arg(long)]
        due: Option<String>,

        /// Due time (e.g., "14:30")
        #[arg(long)]
        time: Option<String>,

        /// Assign to a person (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        assignee: Vec<String>,

        /// Starting progress percentage
        #[arg(short, long, default_value_t = 0)]
        progress: u8,
    },

    /// Edit fields of a task
    Edit {
        /// Task id (or prefix) or a fragment of its title
        task: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New progress percentage
        #[arg(short, long)]
        progress: Option<u8>,

        /// New category label
        #[arg(short, long)]
        category: Option<String>,

        /// New due date (e.g., "2026-03-01")
        #[arg(long)]
        due: Option<String>,

        /// New due time (e.g., "14:30")
        #[arg(long)]
        time: Option<String>,

        /// Replace the assignee list (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        assignee: Vec<String>,
    },

    /// Mark a task as complete (progress 100)
    Done {
        /// Task id (or prefix) or a fragment of its title
        task: String,
    },

    /// Put a completed task back in play (progress 0)
    Reopen {
        /// Task id (or prefix) or a fragment of its title
        task: String,
    },

    /// Delete a task
    Delete {
        /// Task id (or prefix) or a fragment of its title
        task: String,
    },

    /// Manage subtasks
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Manage file attachments
    #[command(subcommand)]
    File(FileCommands),

    /// List categories with task counts
    Categories,

    /// Show task statistics
    Stats,
}

#[derive(Debug, Subcommand)]
enum SubtaskCommands {
    /// Add a subtask to a task
    Add { task: String, title: String },
    /// Mark a subtask as completed
    Done { task: String, subtask: String },
    /// Mark a subtask as not completed
    Undone { task: String, subtask: String },
    /// Delete a subtask
    Delete { task: String, subtask: String },
}

#[derive(Debug, Subcommand)]
enum FileCommands {
    /// Attach a file record to a task
    Add {
        task: String,
        name: String,

        /// MIME type or kind label (defaults to the file extension)
        #[arg(short, long)]
        kind: Option<String>,

        /// Where the file contents live
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Remove every attachment with a name from a task
    Delete { task: String, name: String },
}

fn exit_with_resolve_error(error: ResolveTaskError) -> ! {
    match error {
        ResolveTaskError::TaskNotFound(reference) => {
            eprintln!("Error: Task '{}' not found", reference);
        }
        ResolveTaskError::AmbiguousTask(titles) => {
            eprintln!("Error: Task reference is ambiguous. Multiple tasks found:");
            for title in titles {
                eprintln!("  - {}", title);
            }
            eprintln!("\nPlease be more specific or use the task id.");
        }
    }
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    // Initialize storage
    let storage_path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdeck")
        .join("store.json");

    // Create parent directory if it doesn't exist
    if let Some(parent) = storage_path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Error: Failed to create data directory: {}", e);
            std::process::exit(1);
        });
    }

    let storage = JsonFileStorage::new(storage_path);

    let mut store = match storage.load() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: Failed to load store: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Today) | None => {
            let today = jiff::Zoned::now().date();

            let due_today = store.tasks_by_date(today);
            let overdue: Vec<_> = store.tasks.iter().filter(|t| ui::is_overdue(t)).collect();

            let total = due_today.len() + overdue.len();

            if total == 0 {
                println!("No tasks for today");
            } else {
                ui::render_view_header(&format!("Today ({})", today.strftime("%b %d")), total);

                // Show overdue first if any
                if !overdue.is_empty() {
                    ui::render_section_header("Overdue");
                    for task in overdue {
                        ui::render_task_line(task, true);
                    }
                }

                for task in &due_today {
                    ui::render_task_line(task, false);
                }
            }
        }
        Some(Commands::List { category, date }) => {
            if let Some(date_str) = date {
                // Filter by calendar due date
                let date = match date_str.parse::<jiff::civil::Date>() {
                    Ok(date) => date,
                    Err(e) => {
                        eprintln!("Error: Invalid date '{}': {}", date_str, e);
                        eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2026-03-01)");
                        std::process::exit(1);
                    }
                };

                let tasks = store.tasks_by_date(date);
                if tasks.is_empty() {
                    println!("No tasks due {}", ui::format_date_header(date));
                } else {
                    ui::render_view_header(&ui::format_date_header(date), tasks.len());
                    for task in &tasks {
                        ui::render_task_line(task, ui::is_overdue(task));
                    }
                }
            } else if let Some(category) = category {
                // Filter by exact category
                let tasks = store.tasks_by_category(Some(&category));
                if tasks.is_empty() {
                    println!("No tasks in category '{}'", category);

                    let categories = store.categories();
                    if !categories.is_empty() {
                        println!("\nAvailable categories:");
                        for category in categories {
                            println!("  - {}", category);
                        }
                    }
                } else {
                    ui::render_view_header(&category, tasks.len());
                    for task in &tasks {
                        ui::render_task_line(task, ui::is_overdue(task));
                    }
                }
            } else {
                // Everything, grouped by category
                let stats = store.stats();
                if store.tasks.is_empty() {
                    println!("No tasks yet");
                } else {
                    ui::render_view_header("All Tasks", stats.total);
                    println!(
                        "  {}",
                        format!(
                            "{} completed · {} in progress",
                            stats.completed, stats.in_progress
                        )
                        .dimmed()
                    );

                    for category in store.categories() {
                        ui::render_section_header(&category);
                        for task in store.tasks_by_category(Some(&category)) {
                            ui::render_task_line(&task, ui::is_overdue(&task));
                        }
                    }
                }
            }
        }
        Some(Commands::Show { task }) => {
            let task_id = match services::resolve_task(&store, &task) {
                Ok(task_id) => task_id,
                Err(e) => exit_with_resolve_error(e),
            };

            // Selection drives the detail view; it is transient UI
            // state and is never written to disk
            let selected = store.get_task(task_id).cloned();
            store.set_selected_task(selected);

            if let Some(task) = &store.selected_task {
                ui::render_task_detail(task);
            }
        }
        Some(Commands::Add {
            title,
            description,
            category,
            due,
            time,
            assignee,
            progress,
        }) => {
            let params = AddTaskParameters {
                title,
                description,
                category,
                due_date: due,
                time,
                assignees: assignee,
                progress,
            };

            match add_task(&mut store, &storage, params) {
                Ok(task) => {
                    println!("✓ Task added: {}", task.title);
                    println!("  {}", task.id.to_string().dimmed());
                    println!("  Category: {}", task.category);
                    if let Some(due) = &task.due_date {
                        println!("  Due: {}", due);
                    }
                }
                Err(AddTaskError::EmptyTitle) => {
                    eprintln!("Error: Task title cannot be empty");
                    std::process::exit(1);
                }
                Err(AddTaskError::EmptyCategory) => {
                    eprintln!("Error: Task category cannot be empty");
                    eprintln!("\nExample: taskdeck add 'Ship report' --category Work");
                    std::process::exit(1);
                }
                Err(AddTaskError::DuplicateAssignee(name)) => {
                    eprintln!("Error: Assignee '{}' is listed more than once", name);
                    std::process::exit(1);
                }
                Err(AddTaskError::InvalidDueDate(date_str, error)) => {
                    eprintln!("Error: Invalid due date '{}': {}", date_str, error);
                    eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2026-03-01)");
                    std::process::exit(1);
                }
                Err(AddTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Edit {
            task,
            title,
            description,
            progress,
            category,
            due,
            time,
            assignee,
        }) => {
            let params = UpdateTaskParameters {
                task,
                title,
                description,
                progress,
                category,
                due_date: due,
                time,
                assignees: if assignee.is_empty() {
                    None
                } else {
                    Some(assignee)
                },
            };

            match update_task(&mut store, &storage, params) {
                Ok(task) => {
                    println!("✓ Task updated: {}", task.title);
                }
                Err(UpdateTaskError::Resolve(e)) => exit_with_resolve_error(e),
                Err(UpdateTaskError::InvalidDueDate(date_str, error)) => {
                    eprintln!("Error: Invalid due date '{}': {}", date_str, error);
                    eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2026-03-01)");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Done { task }) => {
            match complete_task(&mut store, &storage, &task) {
                Ok(task) => {
                    println!("✓ Task completed: {}", task.title);
                }
                Err(UpdateTaskError::Resolve(e)) => exit_with_resolve_error(e),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Reopen { task }) => {
            match reopen_task(&mut store, &storage, &task) {
                Ok(task) => {
                    println!("✓ Task reopened: {}", task.title);
                }
                Err(UpdateTaskError::Resolve(e)) => exit_with_resolve_error(e),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Delete { task }) => {
            match delete_task(&mut store, &storage, &task) {
                Ok(task) => {
                    println!("✓ Task deleted: {}", task.title);
                }
                Err(DeleteTaskError::Resolve(e)) => exit_with_resolve_error(e),
                Err(DeleteTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to delete task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Subtask(command)) => {
            let result = match command {
                SubtaskCommands::Add { task, title } => add_subtask(
                    &mut store,
                    &storage,
                    AddSubtaskParameters { task, title },
                )
                .map(|task| ("Subtask added to", task)),
                SubtaskCommands::Done { task, subtask } => toggle_subtask(
                    &mut store,
                    &storage,
                    ToggleSubtaskParameters {
                        task,
                        subtask,
                        completed: true,
                    },
                )
                .map(|task| ("Subtask completed on", task)),
                SubtaskCommands::Undone { task, subtask } => toggle_subtask(
                    &mut store,
                    &storage,
                    ToggleSubtaskParameters {
                        task,
                        subtask,
                        completed: false,
                    },
                )
                .map(|task| ("Subtask reopened on", task)),
                SubtaskCommands::Delete { task, subtask } => delete_subtask(
                    &mut store,
                    &storage,
                    DeleteSubtaskParameters { task, subtask },
                )
                .map(|task| ("Subtask deleted from", task)),
            };

            match result {
                Ok((action, task)) => {
                    let done = task.subtasks.iter().filter(|s| s.completed).count();
                    println!("✓ {} '{}'", action, task.title);
                    println!("  {}/{} subtasks completed", done, task.subtasks.len());
                }
                Err(SubtaskError::Task(e)) => exit_with_resolve_error(e),
                Err(SubtaskError::AmbiguousSubtask(titles)) => {
                    eprintln!("Error: Subtask reference is ambiguous. Multiple subtasks found:");
                    for title in titles {
                        eprintln!("  - {}", title);
                    }
                    eprintln!("\nPlease be more specific or use the subtask position.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::File(command)) => {
            let result = match command {
                FileCommands::Add {
                    task,
                    name,
                    kind,
                    url,
                } => add_file(
                    &mut store,
                    &storage,
                    AddFileParameters {
                        task,
                        name,
                        kind,
                        url,
                    },
                )
                .map(|task| ("File attached to", task)),
                FileCommands::Delete { task, name } => delete_file(
                    &mut store,
                    &storage,
                    DeleteFileParameters { task, name },
                )
                .map(|task| ("File removed from", task)),
            };

            match result {
                Ok((action, task)) => {
                    println!("✓ {} '{}'", action, task.title);
                    println!(
                        "  {} {}",
                        task.files.len(),
                        if task.files.len() == 1 {
                            "file attached"
                        } else {
                            "files attached"
                        }
                    );
                }
                Err(FileError::Task(e)) => exit_with_resolve_error(e),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Categories) => {
            let categories = store.categories();

            if categories.is_empty() {
                println!("No categories found");
            } else {
                println!(
                    "{} ({} {})\n",
                    "CATEGORIES".cyan(),
                    categories.len(),
                    if categories.len() == 1 {
                        "category"
                    } else {
                        "categories"
                    }
                );

                for category in categories {
                    let count = store.tasks_by_category(Some(&category)).len();
                    println!(
                        "  {} {} {}",
                        "•".green(),
                        category.bold(),
                        format!("({} {})", count, if count == 1 { "task" } else { "tasks" })
                            .dimmed()
                    );
                }
            }
        }
        Some(Commands::Stats) => {
            let stats = store.stats();

            ui::render_view_header("Overview", stats.total);

            let not_started = stats.total - stats.completed - stats.in_progress;
            println!("  {}  {} completed", "✓".green(), stats.completed);
            println!("  {}  {} in progress", "◐".normal(), stats.in_progress);
            println!("  {}  {} not started", "○".normal(), not_started);
        }
    }
}
