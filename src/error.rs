use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::domain::CanonicalField;

#[derive(Debug, Error, Diagnostic)]
pub enum GymError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("profile not found: {0}")]
    #[diagnostic(help("check the user id; the store has no worksheet with rows for it"))]
    ProfileNotFound(String),

    #[error("exercise not found: {0}")]
    ExerciseNotFound(String),

    #[error("workout store unavailable: {0}")]
    SourceUnavailable(String),

    #[error("sheet request failed: {0}")]
    SheetHttp(String),

    #[error("sheet endpoint returned status {status}: {message}")]
    SheetStatus { status: u16, message: String },

    #[error("failed to read store file at {0}")]
    StoreRead(PathBuf),

    #[error("failed to parse store data: {0}")]
    StoreParse(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellIssue {
    MalformedNumber { field: CanonicalField, raw: String },
    MalformedDate { raw: String },
    MalformedCount { field: CanonicalField, raw: String },
    MissingColumn { field: CanonicalField },
}

impl CellIssue {
    pub fn field(&self) -> CanonicalField {
        match self {
            CellIssue::MalformedNumber { field, .. }
            | CellIssue::MalformedCount { field, .. }
            | CellIssue::MissingColumn { field } => *field,
            CellIssue::MalformedDate { .. } => CanonicalField::Date,
        }
    }
}

impl fmt::Display for CellIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellIssue::MalformedNumber { field, raw } => {
                write!(f, "{field}: malformed number {raw:?}, using 0")
            }
            CellIssue::MalformedDate { raw } => write!(f, "date: unparsed value {raw:?}"),
            CellIssue::MalformedCount { field, raw } => {
                write!(f, "{field}: malformed count {raw:?}, left empty")
            }
            CellIssue::MissingColumn { field } => write!(f, "{field}: column missing, default injected"),
        }
    }
}
