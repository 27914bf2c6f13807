//! Some utility functions

use crate::dashboard::Summary;
use crate::diagnostics::{KeyStatus, StorageReport};
use crate::Task;

/// A debug utility that pretty-prints tasks
pub fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    println!("    {} {}\t[{}] {}", completion, task.title(), task.priority(), task.id());
}

/// A debug utility that pretty-prints what the storage contains
pub fn print_report(report: &StorageReport) {
    println!("Platform: {}", report.platform);
    for (key, status) in &report.keys {
        match status {
            KeyStatus::Empty => println!("    {:<10} no data", key),
            KeyStatus::Items(n) => println!("    {:<10} {} item(s)", key, n),
            KeyStatus::Invalid => println!("    {:<10} invalid data", key),
        }
    }
    println!("Total: {} item(s)", report.total_items());
}

pub fn print_summary(summary: &Summary) {
    println!("Items:            {}", summary.total_items);
    println!("Completed tasks:  {}", summary.completed_tasks);
    println!("Active reminders: {}", summary.active_reminders);
    println!("Pinned notes:     {}", summary.pinned_notes);
    println!("Events per month:");
    for (month, count) in &summary.events_per_month {
        println!("    {}  {}", month, count);
    }
    println!("Tasks per category:");
    for (category, count) in &summary.tasks_per_category {
        println!("    {:<10} {}", category, count);
    }
    println!("Priorities:");
    for (priority, count) in &summary.priority_distribution {
        println!("    {:<10} {}", priority, count);
    }
}
