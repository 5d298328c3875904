use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::coerce;
use crate::config::ResolvedConfig;
use crate::domain::{CanonicalField, RawRecord, WorkoutDate, WorkoutEntry, cell_text};
use crate::error::CellIssue;

const UNIT_SUFFIXES: &[&str] = &["kg", "kgs", "lb", "lbs", "min", "mins", "minutes", "minutos"];

const BUILTIN_VARIANTS: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Date,
        &["data", "date", "dia", "day", "data treino", "workout date"],
    ),
    (
        CanonicalField::Exercise,
        &[
            "exercicio",
            "exercicios",
            "exercise",
            "exercises",
            "exercise name",
            "nome exercicio",
            "movimento",
            "movement",
        ],
    ),
    (
        CanonicalField::Load,
        &["carga", "load", "weight", "peso", "intensidade", "intensity"],
    ),
    (CanonicalField::Sets, &["series", "serie", "sets", "set"]),
    (
        CanonicalField::Reps,
        &["reps", "rep", "repeticoes", "repeticao", "repetitions"],
    ),
    (
        CanonicalField::Notes,
        &[
            "notas",
            "nota",
            "notes",
            "note",
            "obs",
            "observacao",
            "observacoes",
            "comments",
            "comentarios",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    #[serde(flatten)]
    pub issue: CellIssue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub rows: usize,
    pub issues: Vec<RowIssue>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, field: CanonicalField) -> usize {
        self.issues
            .iter()
            .filter(|row| row.issue.field() == field)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub entry: WorkoutEntry,
    pub issues: Vec<CellIssue>,
}

#[derive(Debug, Clone)]
pub struct ColumnNormalizer {
    variants: HashMap<String, CanonicalField>,
    default_exercise: String,
}

impl ColumnNormalizer {
    pub fn new(aliases: &[(CanonicalField, String)], default_exercise: impl Into<String>) -> Self {
        let mut variants = HashMap::new();
        for (field, names) in BUILTIN_VARIANTS {
            for name in *names {
                variants.insert(header_key(name), *field);
            }
        }
        for (field, header) in aliases {
            let key = header_key(header);
            if !key.is_empty() {
                variants.insert(key, *field);
            }
        }
        Self {
            variants,
            default_exercise: default_exercise.into(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(&config.column_aliases, config.default_exercise.clone())
    }

    pub fn canonical_field(&self, header: &str) -> Option<CanonicalField> {
        self.variants.get(&header_key(header)).copied()
    }

    pub fn normalize(&self, record: &RawRecord, today: NaiveDate) -> NormalizedRow {
        let mut slots: BTreeMap<CanonicalField, &Value> = BTreeMap::new();
        let mut extra = BTreeMap::new();

        for (header, value) in record.iter() {
            match self.canonical_field(header) {
                // Duplicate variants of one field: the first non-blank cell wins.
                Some(field) => {
                    let replace = match slots.get(&field) {
                        None => true,
                        Some(existing) => is_blank(existing) && !is_blank(value),
                    };
                    if replace {
                        slots.insert(field, value);
                    }
                }
                None => {
                    extra.insert(
                        header.trim().to_string(),
                        cell_text(value).unwrap_or_default(),
                    );
                }
            }
        }

        let mut issues = Vec::new();

        let date = match slots.get(&CanonicalField::Date) {
            None => {
                issues.push(CellIssue::MissingColumn {
                    field: CanonicalField::Date,
                });
                WorkoutDate::Parsed(today)
            }
            Some(value) => match coerce::parse_date_cell(value) {
                Ok(date) => WorkoutDate::Parsed(date),
                Err(issue) => {
                    let raw = match &issue {
                        CellIssue::MalformedDate { raw } => raw.clone(),
                        _ => String::new(),
                    };
                    issues.push(issue);
                    WorkoutDate::Unparsed(raw)
                }
            },
        };

        let exercise_name = match slots.get(&CanonicalField::Exercise) {
            None => {
                issues.push(CellIssue::MissingColumn {
                    field: CanonicalField::Exercise,
                });
                self.default_exercise.clone()
            }
            Some(value) => cell_text(value)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| self.default_exercise.clone()),
        };

        let load = match slots.get(&CanonicalField::Load) {
            None => {
                issues.push(CellIssue::MissingColumn {
                    field: CanonicalField::Load,
                });
                0.0
            }
            Some(value) => coerce::parse_load(value).unwrap_or_else(|issue| {
                issues.push(issue);
                0.0
            }),
        };

        let mut count = |field: CanonicalField| -> Option<u32> {
            let value = slots.get(&field)?;
            coerce::parse_count(field, value).unwrap_or_else(|issue| {
                issues.push(issue);
                None
            })
        };
        let sets = count(CanonicalField::Sets);
        let reps = count(CanonicalField::Reps);

        let notes = slots
            .get(&CanonicalField::Notes)
            .and_then(|value| cell_text(value))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        NormalizedRow {
            entry: WorkoutEntry {
                date,
                exercise_name,
                load,
                sets,
                reps,
                notes,
                extra,
            },
            issues,
        }
    }

    /// Normalizes a whole worksheet. A missing column is reported once, at the
    /// first row lacking it.
    pub fn normalize_batch(
        &self,
        records: &[RawRecord],
        today: NaiveDate,
    ) -> (Vec<WorkoutEntry>, IngestReport) {
        let mut entries = Vec::with_capacity(records.len());
        let mut report = IngestReport {
            rows: records.len(),
            issues: Vec::new(),
        };

        for (row, record) in records.iter().enumerate() {
            let normalized = self.normalize(record, today);
            for issue in normalized.issues {
                let seen = matches!(issue, CellIssue::MissingColumn { .. })
                    && report.issues.iter().any(|existing| existing.issue == issue);
                if seen {
                    continue;
                }
                tracing::debug!(row, %issue, "absorbed cell issue");
                report.issues.push(RowIssue { row, issue });
            }
            entries.push(normalized.entry);
        }

        if !report.is_clean() {
            tracing::warn!(
                rows = report.rows,
                issues = report.issues.len(),
                "worksheet normalized with defaults substituted"
            );
        }
        (entries, report)
    }
}

impl Default for ColumnNormalizer {
    fn default() -> Self {
        Self::from_config(&ResolvedConfig::default())
    }
}

pub fn header_key(header: &str) -> String {
    let mut text = fold_text(header.trim());
    while let Some(stripped) = strip_bracketed_suffix(&text) {
        text = stripped;
    }

    let folded: String = text
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    if tokens.len() > 1 && tokens.last().is_some_and(|last| UNIT_SUFFIXES.contains(last)) {
        tokens.pop();
    }
    tokens.join(" ")
}

fn strip_bracketed_suffix(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    let open = match trimmed.chars().last()? {
        ')' => '(',
        ']' => '[',
        _ => return None,
    };
    let start = trimmed.rfind(open)?;
    let head = trimmed[..start].trim_end();
    (!head.is_empty()).then(|| head.to_string())
}

pub fn fold_text(text: &str) -> String {
    text.to_lowercase().chars().map(fold_accent).collect()
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn is_blank(value: &Value) -> bool {
    cell_text(value).is_none_or(|text| text.trim().is_empty())
}
