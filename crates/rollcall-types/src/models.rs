use serde::{Deserialize, Serialize};

/// One scheduled workout, already resolved from the calendar or scheduling API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Area of operation: where the workout happens.
    pub ao: String,
    /// Start time as `HHmm`.
    pub start: String,
    /// Who leads it.
    pub q: String,
    /// Workout-type emojis, may be empty.
    #[serde(default)]
    pub types: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarLinks {
    #[serde(default)]
    pub google: Option<String>,
    #[serde(default)]
    pub ical: Option<String>,
}

impl CalendarLinks {
    pub fn is_empty(&self) -> bool {
        self.google.is_none() && self.ical.is_none()
    }
}
