use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Workout type label used for days without exercises.
pub const REST: &str = "Rest";

pub const PLACEHOLDER_NAME: &str = "New Exercise";
pub const DEFAULT_REPS: u32 = 10;

/// Day keys in display order. Templates are stored under these keys.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub reps: u32,
    pub weight: f64,
}

impl Set {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }
}

impl Default for Set {
    fn default() -> Self {
        Self {
            reps: DEFAULT_REPS,
            weight: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub name: String,
    pub sets: Vec<Set>,
}

impl ExerciseRecord {
    pub fn new(name: &str, sets: Vec<Set>) -> Self {
        Self {
            name: name.to_string(),
            sets,
        }
    }

    /// A freshly added exercise: placeholder name and one default set.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_NAME, vec![Set::default()])
    }

    /// Weight shown in the card header. Every exercise has at least one set.
    pub fn display_weight(&self) -> f64 {
        self.sets.first().map(|s| s.weight).unwrap_or(0.0)
    }
}

/// A weekly template, keyed externally by day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseRecord>,
}

impl PlanTemplate {
    pub fn new(kind: &str, exercises: Vec<ExerciseRecord>) -> Self {
        Self {
            kind: kind.to_string(),
            exercises,
        }
    }

    pub fn rest() -> Self {
        Self::new(REST, Vec::new())
    }

    pub fn is_rest(&self) -> bool {
        self.kind == REST
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseRecord>,
}

impl WorkoutSession {
    /// Hydrate the session for `date` from its weekday template. A missing
    /// template means a rest day.
    pub fn from_template(date: NaiveDate, template: Option<&PlanTemplate>) -> Self {
        match template {
            Some(t) => Self {
                date,
                kind: t.kind.clone(),
                exercises: t.exercises.clone(),
            },
            None => Self {
                date,
                kind: REST.to_string(),
                exercises: Vec::new(),
            },
        }
    }

    pub fn to_template(&self) -> PlanTemplate {
        PlanTemplate {
            kind: self.kind.clone(),
            exercises: self.exercises.clone(),
        }
    }

    pub fn is_rest(&self) -> bool {
        self.kind == REST
    }

    /// Structural comparison against a template: type, names, set values, order.
    pub fn differs_from(&self, template: &PlanTemplate) -> bool {
        self.kind != template.kind || self.exercises != template.exercises
    }
}

/// Lower-cased weekday name used as the template key.
pub fn day_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

pub fn day_key_for(date: NaiveDate) -> &'static str {
    day_key(date.weekday())
}

pub fn day_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d %Y").to_string()
}
