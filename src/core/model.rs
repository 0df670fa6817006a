//! Vote records and the weekday domain

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The five votable weekdays. The game only runs on workdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }

    /// Case-insensitive parse of a (possibly padded) day name.
    pub fn parse(input: &str) -> Option<Weekday> {
        match input.trim().to_lowercase().as_str() {
            "monday" => Some(Weekday::Monday),
            "tuesday" => Some(Weekday::Tuesday),
            "wednesday" => Some(Weekday::Wednesday),
            "thursday" => Some(Weekday::Thursday),
            "friday" => Some(Weekday::Friday),
            _ => None,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted vote record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: u64,
    pub name: String,
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub note: Option<String>,
    /// Records written before this field existed deserialize as "unknown".
    #[serde(default = "unknown_stamp")]
    pub created_at: String,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn unknown_stamp() -> String {
    "unknown".to_string()
}

fn default_active() -> bool {
    true
}

/// Incoming vote payload, before validation.
#[derive(Debug, Deserialize)]
pub struct NewVote {
    pub name: String,
    pub days: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidateError {
    #[error("name cannot be empty or just spaces")]
    EmptyName,
    #[error("no valid weekday given")]
    NoValidDay,
}

/// A payload that passed validation: trimmed name, at least one recognized
/// weekday, duplicates removed (first occurrence wins).
#[derive(Debug)]
pub struct ValidVote {
    pub name: String,
    pub days: Vec<Weekday>,
    pub note: Option<String>,
}

impl NewVote {
    pub fn validate(self) -> Result<ValidVote, ValidateError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidateError::EmptyName);
        }

        let mut days: Vec<Weekday> = Vec::new();
        for raw in &self.days {
            if let Some(day) = Weekday::parse(raw) {
                if !days.contains(&day) {
                    days.push(day);
                }
            }
        }
        if days.is_empty() {
            return Err(ValidateError::NoValidDay);
        }

        Ok(ValidVote {
            name,
            days,
            note: self.note,
        })
    }
}
