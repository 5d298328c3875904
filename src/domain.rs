use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GymError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = GymError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = !normalized.is_empty()
            && normalized != "."
            && !normalized.contains("..")
            && !normalized
                .chars()
                .any(|ch| ch == '/' || ch == '\\' || ch.is_control());
        if !is_valid {
            return Err(GymError::InvalidUserId(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalField {
    Date,
    Exercise,
    Load,
    Sets,
    Reps,
    Notes,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Date,
        CanonicalField::Exercise,
        CanonicalField::Load,
        CanonicalField::Sets,
        CanonicalField::Reps,
        CanonicalField::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Exercise => "exercise",
            CanonicalField::Load => "load",
            CanonicalField::Sets => "sets",
            CanonicalField::Reps => "reps",
            CanonicalField::Notes => "notes",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = GymError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| GymError::InvalidConfig(format!("unknown canonical field: {value}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(header.into(), value.into());
    }

    pub fn with(mut self, header: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutDate {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl WorkoutDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            WorkoutDate::Parsed(date) => Some(*date),
            WorkoutDate::Unparsed(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, WorkoutDate::Parsed(_))
    }
}

impl fmt::Display for WorkoutDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutDate::Parsed(date) => write!(f, "{}", date.format("%d/%m/%Y")),
            WorkoutDate::Unparsed(raw) if raw.trim().is_empty() => f.write_str("unparsed"),
            WorkoutDate::Unparsed(raw) => write!(f, "unparsed({raw})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub date: WorkoutDate,
    pub exercise_name: String,
    pub load: f64,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Min,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Kg => write!(f, "kg"),
            Unit::Min => write!(f, "min"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: WorkoutEntry,
    pub is_cardio: bool,
    pub unit: Unit,
    pub estimated_calories: f64,
    pub weekday: Option<String>,
}

impl EnrichedEntry {
    pub fn date(&self) -> Option<NaiveDate> {
        self.entry.date.as_date()
    }

    pub fn load(&self) -> f64 {
        self.entry.load
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_user_id_trims() {
        let id: UserId = " 5511999990000 ".parse().unwrap();
        assert_eq!(id.as_str(), "5511999990000");
    }

    #[test]
    fn parse_user_id_rejects_paths() {
        assert_matches!("../etc".parse::<UserId>(), Err(GymError::InvalidUserId(_)));
        assert_matches!("a/b".parse::<UserId>(), Err(GymError::InvalidUserId(_)));
        assert_matches!("   ".parse::<UserId>(), Err(GymError::InvalidUserId(_)));
    }

    #[test]
    fn canonical_field_round_trips_names() {
        for field in CanonicalField::ALL {
            assert_eq!(field.as_str().parse::<CanonicalField>().unwrap(), field);
        }
        assert_matches!("weight".parse::<CanonicalField>(), Err(GymError::InvalidConfig(_)));
    }

    #[test]
    fn cell_text_keeps_number_spelling() {
        assert_eq!(cell_text(&serde_json::json!(45)), Some("45".to_string()));
        assert_eq!(cell_text(&serde_json::json!(40.5)), Some("40.5".to_string()));
        assert_eq!(cell_text(&Value::Null), None);
    }
}
