use serde::Serialize;

use crate::clock::Clock;
use crate::config::ResolvedConfig;
use crate::domain::{RawRecord, UserId};
use crate::error::GymError;
use crate::metrics::ExerciseSummary;
use crate::pipeline::{Pipeline, WorkoutReport};
use crate::progression::{Tier, TierTable};
use crate::store::WorkoutStore;

#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserId,
    pub display_name: Option<String>,
    records: Vec<RawRecord>,
}

impl Session {
    pub fn new(user: UserId, display_name: Option<String>, records: Vec<RawRecord>) -> Self {
        Self {
            user,
            display_name,
            records,
        }
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: String,
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub report: WorkoutReport,
}

impl Dashboard {
    pub fn exercise(&self, name: &str) -> Option<&ExerciseSummary> {
        self.report.exercise(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseResult {
    pub user: String,
    pub today: chrono::NaiveDate,
    #[serde(flatten)]
    pub summary: ExerciseSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierRow {
    pub name: String,
    pub floor: f64,
    pub ceiling: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TiersResult {
    pub tiers: Vec<TierRow>,
}

impl TiersResult {
    pub fn from_table(table: &TierTable) -> Self {
        let tiers = table
            .tiers()
            .iter()
            .enumerate()
            .map(|(index, Tier { name, ceiling })| TierRow {
                name: name.clone(),
                floor: table.floor(index),
                ceiling: *ceiling,
            })
            .collect();
        Self { tiers }
    }
}

pub struct App<S: WorkoutStore, C: Clock> {
    store: S,
    clock: C,
    pipeline: Pipeline,
}

impl<S: WorkoutStore, C: Clock> App<S, C> {
    pub fn new(store: S, clock: C, config: ResolvedConfig) -> Self {
        Self {
            store,
            clock,
            pipeline: Pipeline::new(config),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        self.pipeline.config()
    }

    pub fn login(&self, user: UserId) -> Result<Session, GymError> {
        let records = self.store.fetch_records(&user)?;
        if records.is_empty() {
            return Err(GymError::ProfileNotFound(user.to_string()));
        }
        let display_name = match self.store.display_name(&user) {
            Ok(name) => name,
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "profile lookup failed");
                None
            }
        };
        tracing::info!(user = %user, rows = records.len(), "session opened");
        Ok(Session::new(user, display_name, records))
    }

    pub fn dashboard(&self, session: &Session) -> Dashboard {
        let today = self.clock.today();
        let report = self.pipeline.run(session.records(), today);
        Dashboard {
            user: session.user.to_string(),
            display_name: session.display_name.clone(),
            report,
        }
    }

    pub fn open(&self, user: UserId) -> Result<Dashboard, GymError> {
        let session = self.login(user)?;
        Ok(self.dashboard(&session))
    }

    pub fn exercise(&self, user: UserId, name: &str) -> Result<ExerciseResult, GymError> {
        let dashboard = self.open(user)?;
        let summary = dashboard
            .exercise(name)
            .cloned()
            .ok_or_else(|| GymError::ExerciseNotFound(name.to_string()))?;
        Ok(ExerciseResult {
            user: dashboard.user,
            today: dashboard.report.today,
            summary,
        })
    }

    pub fn tiers(&self) -> TiersResult {
        TiersResult::from_table(&self.config().tiers)
    }
}
