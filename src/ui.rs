use colored::*;
use jiff::civil::Date;

use crate::models::task::Task;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task, is_overdue: bool) -> ColoredString {
    if task.is_completed() {
        "✓".green()
    } else if is_overdue {
        "●".red()
    } else if task.progress > 0 {
        "◐".normal()
    } else {
        "○".normal()
    }
}

/// Render a single task line with glyph, progress, title, and a
/// right-aligned category/due context
pub fn render_task_line(task: &Task, is_overdue: bool) {
    let terminal_width = get_terminal_width();

    let glyph = get_status_glyph(task, is_overdue);
    let progress = format!("{:>3}%", task.progress);
    let left_section = format!("  {}  {}  {}", glyph, progress, task.title);

    let styled_left = if task.is_completed() {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let mut context_parts = vec![task.category.clone()];
    if let Some(date) = task.due_on() {
        context_parts.push(format_date_header(date));
    }
    let right_section = context_parts.join(" · ");

    let left_visible_len = 2 + 1 + 2 + progress.len() + 2 + task.title.chars().count();
    let right_visible_len = right_section.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_section.dimmed());
    } else {
        // Not enough space for right alignment, just print normally
        println!("{}", styled_left);
    }
}

/// Render the full detail view for a task: description, progress,
/// schedule, assignees, subtasks, and files
pub fn render_task_detail(task: &Task) {
    println!("\n  {}", task.title.bold());
    println!(
        "  {}",
        format!("Created {}", format_timestamp_date(task.created_at)).dimmed()
    );

    if !task.description.is_empty() {
        println!("\n  {}", task.description);
    }

    println!(
        "\n  {} {}",
        progress_bar(task.progress, 24),
        format!("{}%", task.progress).bold()
    );

    println!("\n  {} {}", "Category:".dimmed(), task.category.blue());

    if let Some(due) = &task.due_date {
        let formatted = task
            .due_on()
            .map(format_date_header)
            .unwrap_or_else(|| due.clone());
        match &task.time {
            Some(time) => println!("  {} {} at {}", "Due:".dimmed(), formatted, time),
            None => println!("  {} {}", "Due:".dimmed(), formatted),
        }
    }

    if !task.assignees.is_empty() {
        println!(
            "  {} {}",
            "Assignees:".dimmed(),
            task.assignees.join(", ")
        );
    }

    if !task.subtasks.is_empty() {
        let done = task.subtasks.iter().filter(|s| s.completed).count();
        render_section_header(&format!("Subtasks ({}/{})", done, task.subtasks.len()));
        for (index, subtask) in task.subtasks.iter().enumerate() {
            let checkbox = if subtask.completed {
                "[x]".green()
            } else {
                "[ ]".normal()
            };
            let title = if subtask.completed {
                subtask.title.dimmed()
            } else {
                subtask.title.normal()
            };
            println!("  {:>3}  {} {}", index + 1, checkbox, title);
        }
    }

    if !task.files.is_empty() {
        render_section_header(&format!("Files ({})", task.files.len()));
        for file in &task.files {
            match &file.url {
                Some(url) => println!(
                    "    {} {} {}",
                    file.name.bold(),
                    format!("({})", file.kind).dimmed(),
                    url.underline().dimmed()
                ),
                None => println!(
                    "    {} {}",
                    file.name.bold(),
                    format!("({})", file.kind).dimmed()
                ),
            }
        }
    }

    println!();
}

/// Textual progress bar, e.g. "████████░░░░░░░░"
pub fn progress_bar(progress: u8, width: usize) -> String {
    let clamped = progress.min(100) as usize;
    let filled = clamped * width / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word);
}

/// Render a section header (e.g., "Overdue", "Work")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Check if a task is past its due date and still unfinished
pub fn is_overdue(task: &Task) -> bool {
    if task.is_completed() {
        return false;
    }

    match task.due_on() {
        Some(date) => date < jiff::Zoned::now().date(),
        None => false,
    }
}

/// Format a date as a human-readable header (e.g., "Tomorrow", "Monday, Feb 17")
pub fn format_date_header(date: Date) -> String {
    let today = jiff::Zoned::now().date();

    if date == today {
        "Today".to_string()
    } else if date == today.tomorrow().expect("tomorrow should be valid") {
        "Tomorrow".to_string()
    } else if date == today.yesterday().expect("yesterday should be valid") {
        "Yesterday".to_string()
    } else {
        date.strftime("%A, %b %d").to_string()
    }
}

/// Format a timestamp as a calendar date in the system time zone
pub fn format_timestamp_date(timestamp: jiff::Timestamp) -> String {
    let zoned = jiff::Zoned::new(timestamp, jiff::tz::TimeZone::system());
    zoned.strftime("%b %d, %Y").to_string()
}
