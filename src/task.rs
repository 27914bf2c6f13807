//! To-do tasks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{now_timestamp, RecordId, DATE_FORMAT};

/// A to-do task
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    id: RecordId,
    /// The display name of the task
    #[serde(deserialize_with = "crate::record::lenient")]
    title: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    description: String,
    /// Free-form, usually one of [`crate::dashboard::TASK_CATEGORIES`]
    #[serde(deserialize_with = "crate::record::lenient")]
    category: String,
    /// Free-form, usually one of [`crate::dashboard::PRIORITIES`]
    #[serde(deserialize_with = "crate::record::lenient")]
    priority: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    estimated_hours: f64,
    #[serde(deserialize_with = "crate::record::lenient")]
    is_completed: bool,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    due_date: Option<String>,
    /// `YYYY-MM-DD HH:MM`, set once when the task is created
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    created_at: Option<String>,

    /// Fields this crate does not know about. They are kept so that they are written back unchanged
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl_record!(Task, "tasks");

impl Task {
    /// Create a brand new task. It has no id yet, one will be given when it is added to a collection
    pub fn new(title: String, description: String, category: String, priority: String, estimated_hours: f64) -> Self {
        Self {
            title,
            description,
            category,
            priority,
            estimated_hours,
            created_at: Some(now_timestamp()),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &RecordId          { &self.id              }
    pub fn title(&self) -> &str            { &self.title           }
    pub fn description(&self) -> &str      { &self.description     }
    pub fn category(&self) -> &str         { &self.category        }
    pub fn priority(&self) -> &str         { &self.priority        }
    pub fn estimated_hours(&self) -> f64   { self.estimated_hours  }
    pub fn completed(&self) -> bool        { self.is_completed     }
    pub fn due_date(&self) -> Option<&str>   { self.due_date.as_deref()   }
    pub fn created_at(&self) -> Option<&str> { self.created_at.as_deref() }
    pub fn extra(&self) -> &Map<String, Value> { &self.extra }

    pub fn set_title(&mut self, new_title: String) {
        self.title = new_title;
    }

    pub fn set_description(&mut self, new_description: String) {
        self.description = new_description;
    }

    pub fn set_priority(&mut self, new_priority: String) {
        self.priority = new_priority;
    }

    /// The parsed due date, if there is one and it is a valid `YYYY-MM-DD` date
    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
    }

    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) {
        self.due_date = due_date.map(|date| date.format(DATE_FORMAT).to_string());
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.is_completed = completed;
    }

    /// Mark a completed task as uncompleted, and the other way around
    pub fn toggle_completed(&mut self) {
        self.is_completed = !self.is_completed;
    }
}
