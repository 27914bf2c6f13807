//! Statistics shown on the dashboard

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{Contact, Event, Note, Reminder, Task};

/// Priorities, from the most to the least urgent
pub const PRIORITIES: [&str; 3] = ["alta", "media", "baixa"];
/// The task categories the dashboard breaks down
pub const TASK_CATEGORIES: [&str; 4] = ["pessoal", "trabalho", "estudos", "casa"];
/// How many months (including the current one) are shown in the per-month breakdown
pub const MONTHS_SHOWN: i32 = 6;

/// An overview of everything the organizer contains
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub total_items: usize,
    pub completed_tasks: usize,
    pub active_reminders: usize,
    pub pinned_notes: usize,
    /// `(YYYY-MM, count)` for the last [`MONTHS_SHOWN`] months, oldest first
    pub events_per_month: Vec<(String, usize)>,
    /// `(category, count)` for every category of [`TASK_CATEGORIES`], in that order
    pub tasks_per_category: Vec<(&'static str, usize)>,
    /// `(priority, count)` over events and tasks. Priorities that are not used are omitted
    pub priority_distribution: Vec<(&'static str, usize)>,
}

impl Summary {
    pub fn compute(events: &[Event], contacts: &[Contact], tasks: &[Task], reminders: &[Reminder], notes: &[Note], today: NaiveDate) -> Self {
        let total_items = events.len() + contacts.len() + tasks.len() + reminders.len() + notes.len();

        let events_per_month = last_months(today, MONTHS_SHOWN)
            .into_iter()
            .map(|(year, month)| {
                let count = events.iter()
                    .filter_map(|event| event.parsed_date())
                    .filter(|date| date.year() == year && date.month() == month)
                    .count();
                (format!("{:04}-{:02}", year, month), count)
            })
            .collect();

        let tasks_per_category = TASK_CATEGORIES.iter()
            .map(|category| (*category, tasks.iter().filter(|task| task.category() == *category).count()))
            .collect();

        let priority_distribution = PRIORITIES.iter()
            .map(|priority| {
                let count = events.iter().filter(|event| event.priority() == *priority).count()
                    + tasks.iter().filter(|task| task.priority() == *priority).count();
                (*priority, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        Self {
            total_items,
            completed_tasks: tasks.iter().filter(|task| task.completed()).count(),
            active_reminders: reminders.iter().filter(|reminder| reminder.is_active()).count(),
            pinned_notes: notes.iter().filter(|note| note.is_pinned()).count(),
            events_per_month,
            tasks_per_category,
            priority_distribution,
        }
    }
}

/// `(year, month)` for the `count` months that end with the month of `today`, oldest first
fn last_months(today: NaiveDate, count: i32) -> Vec<(i32, u32)> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..count).rev()
        .map(|offset| {
            let index = current - offset;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}
