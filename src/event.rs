//! Calendar events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{RecordId, DATE_FORMAT};

/// Something that happens at a given day and time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    id: RecordId,
    #[serde(deserialize_with = "crate::record::lenient")]
    name: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    description: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    location: String,
    /// `YYYY-MM-DD`
    #[serde(deserialize_with = "crate::record::lenient")]
    date: String,
    /// `HH:MM`
    #[serde(deserialize_with = "crate::record::lenient")]
    time: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    priority: String,
    /// A short weather forecast, as it was when the event was saved
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    weather: Option<String>,
    #[serde(deserialize_with = "crate::record::lenient")]
    is_important: bool,
    /// How long before the event a notification should be shown
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    reminder_minutes: Option<u32>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl_record!(Event, "events");

impl Event {
    pub fn new(name: String, date: NaiveDate, time: String, priority: String) -> Self {
        Self {
            name,
            date: date.format(DATE_FORMAT).to_string(),
            time,
            priority,
            ..Self::default()
        }
    }

    pub fn id(&self) -> &RecordId       { &self.id          }
    pub fn name(&self) -> &str          { &self.name        }
    pub fn description(&self) -> &str   { &self.description }
    pub fn location(&self) -> &str      { &self.location    }
    pub fn date(&self) -> &str          { &self.date        }
    pub fn time(&self) -> &str          { &self.time        }
    pub fn priority(&self) -> &str      { &self.priority    }
    pub fn weather(&self) -> Option<&str>        { self.weather.as_deref() }
    pub fn is_important(&self) -> bool           { self.is_important }
    pub fn reminder_minutes(&self) -> Option<u32> { self.reminder_minutes }

    /// The parsed date, or `None` if it is not a valid `YYYY-MM-DD` date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub fn set_name(&mut self, new_name: String) {
        self.name = new_name;
    }

    pub fn set_description(&mut self, new_description: String) {
        self.description = new_description;
    }

    pub fn set_location(&mut self, new_location: String) {
        self.location = new_location;
    }

    pub fn set_date(&mut self, new_date: NaiveDate) {
        self.date = new_date.format(DATE_FORMAT).to_string();
    }

    pub fn set_weather(&mut self, weather: Option<String>) {
        self.weather = weather;
    }

    pub fn set_important(&mut self, important: bool) {
        self.is_important = important;
    }

    pub fn set_reminder_minutes(&mut self, minutes: Option<u32>) {
        self.reminder_minutes = minutes;
    }
}
