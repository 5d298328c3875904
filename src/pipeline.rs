use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::domain::{EnrichedEntry, RawRecord};
use crate::metrics::{
    self, DayTotals, Enricher, ExerciseSummary, StreakSummary, WeekTotals, WeekdayTotals,
};
use crate::normalize::{ColumnNormalizer, IngestReport};
use crate::progression::{self, ProgressionState};

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutReport {
    pub today: NaiveDate,
    pub entries: Vec<EnrichedEntry>,
    pub exercises: Vec<ExerciseSummary>,
    pub progression: ProgressionState,
    pub today_totals: DayTotals,
    pub daily: Vec<DayTotals>,
    pub weekdays: Vec<WeekdayTotals>,
    pub weeks: Vec<WeekTotals>,
    pub streak: StreakSummary,
    pub ingest: IngestReport,
}

impl WorkoutReport {
    pub fn exercise(&self, name: &str) -> Option<&ExerciseSummary> {
        metrics::find_exercise(&self.exercises, name)
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ResolvedConfig,
    normalizer: ColumnNormalizer,
    enricher: Enricher,
}

impl Pipeline {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            normalizer: ColumnNormalizer::from_config(&config),
            enricher: Enricher::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn enrich(&self, records: &[RawRecord], today: NaiveDate) -> (Vec<EnrichedEntry>, IngestReport) {
        let (entries, ingest) = self.normalizer.normalize_batch(records, today);
        (self.enricher.enrich(entries), ingest)
    }

    pub fn run(&self, records: &[RawRecord], today: NaiveDate) -> WorkoutReport {
        let (entries, ingest) = self.enrich(records, today);
        let progression =
            progression::evaluate(&entries, self.config.volume_scope, &self.config.tiers);
        tracing::debug!(
            entries = entries.len(),
            volume = progression.lifetime_volume,
            tier = %progression.tier_name,
            "workout report derived"
        );

        WorkoutReport {
            today,
            exercises: metrics::exercise_summaries(&entries),
            today_totals: metrics::today_totals(&entries, today),
            daily: metrics::daily_totals(&entries),
            weekdays: metrics::weekday_totals(&entries, &self.config.weekday_labels),
            weeks: metrics::weekly_totals(&entries),
            streak: metrics::streaks(&entries, today),
            progression,
            entries,
            ingest,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ResolvedConfig::default())
    }
}
