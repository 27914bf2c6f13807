//! Recurring reminders (medication, bills...)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{now_timestamp, RecordId, DATE_FORMAT};

/// A reminder that fires at a given time, with a given frequency.
///
/// Reminders stored without an `isActive` field are active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reminder {
    id: RecordId,
    #[serde(deserialize_with = "crate::record::lenient")]
    title: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    description: String,
    /// What kind of reminder this is (e.g. `medicamento`)
    #[serde(rename = "type", deserialize_with = "crate::record::lenient")]
    kind: String,
    /// e.g. `diario`
    #[serde(deserialize_with = "crate::record::lenient")]
    frequency: String,
    /// `HH:MM`
    #[serde(deserialize_with = "crate::record::lenient")]
    time: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    is_active: bool,
    /// `YYYY-MM-DD`, the first day the reminder fires
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    date: Option<String>,
    /// `YYYY-MM-DD HH:MM`, set once when the reminder is created
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    created_at: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for Reminder {
    fn default() -> Self {
        Self {
            id: RecordId::default(),
            title: String::new(),
            description: String::new(),
            kind: String::new(),
            frequency: String::new(),
            time: String::new(),
            is_active: true,
            date: None,
            created_at: None,
            extra: Map::new(),
        }
    }
}

impl_record!(Reminder, "reminders");

impl Reminder {
    pub fn new(title: String, description: String, kind: String, frequency: String, time: String) -> Self {
        Self {
            title,
            description,
            kind,
            frequency,
            time,
            created_at: Some(now_timestamp()),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &RecordId       { &self.id          }
    pub fn title(&self) -> &str         { &self.title       }
    pub fn description(&self) -> &str   { &self.description }
    pub fn kind(&self) -> &str          { &self.kind        }
    pub fn frequency(&self) -> &str     { &self.frequency   }
    pub fn time(&self) -> &str          { &self.time        }
    pub fn is_active(&self) -> bool     { self.is_active    }
    pub fn date(&self) -> Option<&str>       { self.date.as_deref()       }
    pub fn created_at(&self) -> Option<&str> { self.created_at.as_deref() }

    /// The parsed start date, if there is one and it is a valid `YYYY-MM-DD` date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
    }

    pub fn set_title(&mut self, new_title: String) {
        self.title = new_title;
    }

    pub fn set_time(&mut self, new_time: String) {
        self.time = new_time;
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date.map(|date| date.format(DATE_FORMAT).to_string());
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn toggle_active(&mut self) {
        self.is_active = !self.is_active;
    }
}
