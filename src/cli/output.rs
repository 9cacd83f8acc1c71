//! CLI output formatting utilities.

use crate::plan::Plan;
use crate::store::SavedPlan;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a generated plan.
    pub fn plan(plan: &Plan) {
        Output::header(&plan.title);
        if !plan.description.is_empty() {
            println!("{}", plan.description);
        }
        for (i, task) in plan.task_list.iter().enumerate() {
            println!(
                "\n{} {}",
                style(format!("{}.", i + 1)).cyan().bold(),
                style(&task.task_title).bold()
            );
            if !task.task_description.is_empty() {
                println!("   {}", task.task_description);
            }
            for sub in &task.sub_tasks {
                println!("   {} {}", style("-").dim(), sub);
            }
        }
    }

    /// Print a saved roadmap with its progress flags.
    pub fn roadmap(plan: &SavedPlan) {
        Output::header(&plan.title);
        Output::kv("ID", &plan.id.to_string());
        if let Some(prompt) = &plan.original_prompt {
            Output::kv("Prompt", prompt);
        }
        Output::kv("Progress", &format!("{:.0}%", plan.progress() * 100.0));
        Output::kv("Created", &plan.created_at.format("%Y-%m-%d %H:%M").to_string());
        if !plan.description.is_empty() {
            println!("\n{}", plan.description);
        }
        for task in &plan.tasks_list {
            println!("\n{} {}", checkbox(task.completed), style(&task.title).bold());
            if !task.task_description.is_empty() {
                println!("    {}", task.task_description);
            }
            for action in &task.sub_tasks {
                println!("    {} {}", checkbox(action.completed), action.action_title);
            }
        }
    }

    /// Print a one-line roadmap summary.
    pub fn roadmap_line(plan: &SavedPlan) {
        println!(
            "  {} {} ({}, {} tasks, {:.0}% done)",
            style("*").cyan(),
            style(&plan.title).bold(),
            style(plan.id).dim(),
            plan.tasks_list.len(),
            plan.progress() * 100.0
        );
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn checkbox(done: bool) -> console::StyledObject<&'static str> {
    if done {
        style("[x]").green()
    } else {
        style("[ ]").dim()
    }
}
