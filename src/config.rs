use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::CanonicalField;
use crate::error::GymError;
use crate::metrics::CalorieModel;
use crate::progression::{Tier, TierTable};

pub const DEFAULT_CONFIG_FILE: &str = "gymbot.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub cardio_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub tiers: Option<Vec<TierEntry>>,
    #[serde(default)]
    pub calories: Option<CalorieEntry>,
    #[serde(default)]
    pub volume_scope: Option<VolumeScope>,
    #[serde(default)]
    pub column_aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub weekday_labels: Option<Vec<String>>,
    #[serde(default)]
    pub default_exercise: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TierEntry {
    Shorthand(String),
    Detailed(TierEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TierEntryObject {
    pub name: String,
    pub ceiling: f64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CalorieEntry {
    #[serde(default)]
    pub cardio_per_minute: Option<f64>,
    #[serde(default)]
    pub strength_factor: Option<f64>,
    #[serde(default)]
    pub default_sets: Option<u32>,
    #[serde(default)]
    pub default_reps: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeScope {
    #[default]
    Strength,
    All,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub cardio_keywords: Vec<String>,
    pub tiers: TierTable,
    pub calories: CalorieModel,
    pub volume_scope: VolumeScope,
    pub column_aliases: Vec<(CanonicalField, String)>,
    pub weekday_labels: [String; 7],
    pub default_exercise: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            cardio_keywords: default_cardio_keywords(),
            tiers: TierTable::default(),
            calories: CalorieModel::default(),
            volume_scope: VolumeScope::default(),
            column_aliases: Vec::new(),
            weekday_labels: default_weekday_labels(),
            default_exercise: "General".to_string(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GymError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| GymError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| GymError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, GymError> {
        let defaults = ResolvedConfig::default();
        let schema_version = config.schema_version.unwrap_or(1);

        let cardio_keywords = match config.cardio_keywords {
            Some(keywords) => keywords
                .into_iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            None => defaults.cardio_keywords,
        };

        let tiers = match config.tiers {
            Some(entries) => {
                let tiers = entries
                    .into_iter()
                    .map(|entry| match entry {
                        TierEntry::Shorthand(value) => parse_tier_shorthand(&value),
                        TierEntry::Detailed(obj) => Ok(Tier {
                            name: obj.name.trim().to_string(),
                            ceiling: obj.ceiling,
                        }),
                    })
                    .collect::<Result<Vec<_>, GymError>>()?;
                TierTable::new(tiers)?
            }
            None => defaults.tiers,
        };

        let calories = match config.calories {
            Some(entry) => {
                let base = defaults.calories;
                let model = CalorieModel {
                    cardio_per_minute: entry.cardio_per_minute.unwrap_or(base.cardio_per_minute),
                    strength_factor: entry.strength_factor.unwrap_or(base.strength_factor),
                    default_sets: entry.default_sets.unwrap_or(base.default_sets),
                    default_reps: entry.default_reps.unwrap_or(base.default_reps),
                };
                validate_calories(&model)?;
                model
            }
            None => defaults.calories,
        };

        let mut column_aliases = Vec::new();
        for (field, headers) in config.column_aliases {
            let field: CanonicalField = field.parse()?;
            column_aliases.extend(headers.into_iter().map(|header| (field, header)));
        }

        let weekday_labels = match config.weekday_labels {
            Some(labels) => {
                let count = labels.len();
                <[String; 7]>::try_from(labels).map_err(|_| {
                    GymError::InvalidConfig(format!("weekday_labels needs 7 entries, got {count}"))
                })?
            }
            None => defaults.weekday_labels,
        };

        let default_exercise = config
            .default_exercise
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.default_exercise);

        Ok(ResolvedConfig {
            schema_version,
            cardio_keywords,
            tiers,
            calories,
            volume_scope: config.volume_scope.unwrap_or_default(),
            column_aliases,
            weekday_labels,
            default_exercise,
        })
    }
}

pub fn default_cardio_keywords() -> Vec<String> {
    ["treadmill", "run", "bike", "elliptical", "cardio", "walk"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn default_weekday_labels() -> [String; 7] {
    ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"].map(str::to_string)
}

fn parse_tier_shorthand(value: &str) -> Result<Tier, GymError> {
    let (name, ceiling) = value
        .rsplit_once(':')
        .ok_or_else(|| GymError::InvalidConfig(format!("tier must be Name:ceiling, got {value}")))?;
    let ceiling = ceiling
        .trim()
        .parse::<f64>()
        .map_err(|_| GymError::InvalidConfig(format!("invalid tier ceiling in {value}")))?;
    Ok(Tier {
        name: name.trim().to_string(),
        ceiling,
    })
}

fn validate_calories(model: &CalorieModel) -> Result<(), GymError> {
    let rates_ok = model.cardio_per_minute.is_finite()
        && model.cardio_per_minute >= 0.0
        && model.strength_factor.is_finite()
        && model.strength_factor >= 0.0;
    if !rates_ok {
        return Err(GymError::InvalidConfig(
            "calorie constants must be finite and non-negative".to_string(),
        ));
    }
    if model.default_sets == 0 || model.default_reps == 0 {
        return Err(GymError::InvalidConfig(
            "default sets and reps must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.cardio_keywords, default_cardio_keywords());
        assert_eq!(resolved.tiers.tiers().len(), 6);
        assert_eq!(resolved.volume_scope, VolumeScope::Strength);
        assert_eq!(resolved.default_exercise, "General");
    }

    #[test]
    fn parse_tier_shorthand_splits_on_last_colon() {
        let tier = parse_tier_shorthand("Pro: Gold:1500").unwrap();
        assert_eq!(tier.name, "Pro: Gold");
        assert_eq!(tier.ceiling, 1500.0);
        assert!(parse_tier_shorthand("Rookie").is_err());
    }
}
