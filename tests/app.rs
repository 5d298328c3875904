use std::collections::HashMap;
use std::sync::Mutex;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;

use gymbot_metrics::app::App;
use gymbot_metrics::clock::FixedClock;
use gymbot_metrics::config::ResolvedConfig;
use gymbot_metrics::domain::{RawRecord, UserId, WorkoutDate};
use gymbot_metrics::error::GymError;
use gymbot_metrics::output::JsonOutput;
use gymbot_metrics::store::WorkoutStore;

#[derive(Default)]
struct MemoryStore {
    sheets: HashMap<String, Vec<RawRecord>>,
    names: HashMap<String, String>,
    fetches: Mutex<usize>,
    offline: bool,
}

impl WorkoutStore for MemoryStore {
    fn fetch_records(&self, user: &UserId) -> Result<Vec<RawRecord>, GymError> {
        *self.fetches.lock().unwrap() += 1;
        if self.offline {
            return Err(GymError::SourceUnavailable("offline".to_string()));
        }
        self.sheets
            .get(user.as_str())
            .cloned()
            .ok_or_else(|| GymError::ProfileNotFound(user.to_string()))
    }

    fn display_name(&self, user: &UserId) -> Result<Option<String>, GymError> {
        Ok(self.names.get(user.as_str()).cloned())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn user(id: &str) -> UserId {
    id.parse().unwrap()
}

fn bench_rows() -> Vec<RawRecord> {
    vec![
        RawRecord::new()
            .with("Carga", "40,5")
            .with("Exercicio", "Supino")
            .with("Data", "05/01/2026"),
        RawRecord::new()
            .with("carga", "45")
            .with("Exercicio", "Supino")
            .with("Data", "06/01/2026"),
    ]
}

fn app_with(store: MemoryStore, today: NaiveDate) -> App<MemoryStore, FixedClock> {
    App::new(store, FixedClock(today), ResolvedConfig::default())
}

#[test]
fn end_to_end_bench_press() {
    let mut store = MemoryStore::default();
    store.sheets.insert("5511".to_string(), bench_rows());
    let app = app_with(store, date(2026, 1, 6));

    let dashboard = app.open(user("5511")).unwrap();
    let report = &dashboard.report;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].entry.load, 40.5);
    assert_eq!(report.entries[1].entry.load, 45.0);
    assert_eq!(report.entries[0].entry.date, WorkoutDate::Parsed(date(2026, 1, 5)));
    assert_eq!(report.entries[1].entry.date, WorkoutDate::Parsed(date(2026, 1, 6)));

    let bench = dashboard.exercise("supino").unwrap();
    assert_eq!(bench.last, 45.0);
    assert_eq!(bench.record, 45.0);
    assert_eq!(bench.sessions, 2);

    assert_eq!(report.progression.lifetime_volume, 85.5);
    assert_eq!(report.progression.tier_name, "Beginner");
    assert_eq!(report.progression.progress_pct, 4);
    assert!(report.ingest.is_clean());
}

#[test]
fn last_and_record_ignore_insertion_order() {
    let rows = vec![
        RawRecord::new()
            .with("Exercicio", "Agachamento")
            .with("Carga", 30)
            .with("Data", "03/02/2026"),
        RawRecord::new()
            .with("Exercicio", "Agachamento")
            .with("Carga", 10)
            .with("Data", "10/02/2026"),
        RawRecord::new()
            .with("Exercicio", "Agachamento")
            .with("Carga", 20)
            .with("Data", "01/02/2026"),
    ];
    let mut store = MemoryStore::default();
    store.sheets.insert("u1".to_string(), rows);
    let dashboard = app_with(store, date(2026, 2, 10)).open(user("u1")).unwrap();

    let squat = dashboard.exercise("Agachamento").unwrap();
    assert_eq!(squat.last, 10.0);
    assert_eq!(squat.record, 30.0);
    let loads: Vec<f64> = squat.history.iter().map(|point| point.load).collect();
    assert_eq!(loads, [20.0, 30.0, 10.0]);
}

#[test]
fn missing_profile_is_terminal() {
    let app = app_with(MemoryStore::default(), date(2026, 1, 6));
    assert_matches!(app.login(user("nobody")), Err(GymError::ProfileNotFound(_)));

    let mut store = MemoryStore::default();
    store.sheets.insert("empty".to_string(), Vec::new());
    let app = app_with(store, date(2026, 1, 6));
    assert_matches!(app.open(user("empty")), Err(GymError::ProfileNotFound(_)));

    let store = MemoryStore {
        offline: true,
        ..MemoryStore::default()
    };
    let app = app_with(store, date(2026, 1, 6));
    assert_matches!(app.open(user("5511")), Err(GymError::SourceUnavailable(_)));
}

#[test]
fn dashboard_reuses_session_snapshot() {
    let mut store = MemoryStore::default();
    store.sheets.insert("5511".to_string(), bench_rows());
    store.names.insert("5511".to_string(), "Ana".to_string());
    let app = app_with(store, date(2026, 1, 6));

    let session = app.login(user("5511")).unwrap();
    assert_eq!(session.display_name.as_deref(), Some("Ana"));
    let first = app.dashboard(&session);
    let second = app.dashboard(&session);
    assert_eq!(first.report.entries, second.report.entries);
    assert_eq!(first.display_name.as_deref(), Some("Ana"));
}

#[test]
fn today_bucket_depends_on_clock() {
    let mut store = MemoryStore::default();
    store.sheets.insert("5511".to_string(), bench_rows());
    let on_day = app_with(store, date(2026, 1, 6)).open(user("5511")).unwrap();
    assert_eq!(on_day.report.today_totals.totals.entries, 1);
    assert_eq!(on_day.report.today_totals.totals.load, 45.0);
    assert_eq!(on_day.report.streak.current, 2);

    let mut store = MemoryStore::default();
    store.sheets.insert("5511".to_string(), bench_rows());
    let next_day = app_with(store, date(2026, 1, 7)).open(user("5511")).unwrap();
    assert_eq!(next_day.report.today_totals.totals.entries, 0);
    assert_eq!(next_day.report.streak.current, 0);
    assert_eq!(next_day.report.streak.latest, 2);
}

#[test]
fn malformed_cells_are_absorbed() {
    let rows = vec![
        RawRecord::new()
            .with("Exercício", "Esteira")
            .with("Carga (kg)", "vinte")
            .with("Data", "ontem"),
        RawRecord::new()
            .with("Exercício", "Treadmill")
            .with("Carga (kg)", "20")
            .with("Data", "06/01/2026"),
    ];
    let mut store = MemoryStore::default();
    store.sheets.insert("u2".to_string(), rows);
    let dashboard = app_with(store, date(2026, 1, 6)).open(user("u2")).unwrap();
    let report = &dashboard.report;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[1].entry.load, 0.0);
    assert_eq!(
        report.entries[1].entry.date,
        WorkoutDate::Unparsed("ontem".to_string())
    );
    assert_eq!(report.entries[0].estimated_calories, 140.0);
    assert_eq!(report.ingest.issues.len(), 2);
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.progression.lifetime_volume, 0.0);
}

#[test]
fn missing_columns_get_defaults() {
    let rows = vec![RawRecord::new().with("Notas", "leg day")];
    let mut store = MemoryStore::default();
    store.sheets.insert("u3".to_string(), rows);
    let dashboard = app_with(store, date(2026, 4, 2)).open(user("u3")).unwrap();
    let entry = &dashboard.report.entries[0].entry;

    assert_eq!(entry.exercise_name, "General");
    assert_eq!(entry.load, 0.0);
    assert_eq!(entry.date, WorkoutDate::Parsed(date(2026, 4, 2)));
    assert_eq!(entry.notes.as_deref(), Some("leg day"));
    assert_eq!(entry.sets, None);
    assert_eq!(dashboard.report.ingest.issues.len(), 3);
}

#[test]
fn exercise_lookup_reports_unknown_name() {
    let mut store = MemoryStore::default();
    store.sheets.insert("5511".to_string(), bench_rows());
    let app = app_with(store, date(2026, 1, 6));
    let result = app.exercise(user("5511"), "  SUPINO ").unwrap();
    assert_eq!(result.summary.sessions, 2);
    assert_matches!(
        app.exercise(user("5511"), "Deadlift"),
        Err(GymError::ExerciseNotFound(_))
    );
}

#[test]
fn dashboard_serializes_to_json() {
    let mut store = MemoryStore::default();
    store.sheets.insert("5511".to_string(), bench_rows());
    let dashboard = app_with(store, date(2026, 1, 6)).open(user("5511")).unwrap();
    let rendered = JsonOutput::render(&dashboard).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["user"], json!("5511"));
    assert_eq!(value["today"], json!("2026-01-06"));
    assert_eq!(value["progression"]["tier_name"], json!("Beginner"));
    assert_eq!(value["entries"][0]["date"], json!({ "parsed": "2026-01-05" }));
    assert_eq!(value["entries"][0]["unit"], json!("kg"));
    assert_eq!(value["weekdays"].as_array().unwrap().len(), 7);
}

#[test]
fn tier_table_lists_floors() {
    let app = app_with(MemoryStore::default(), date(2026, 1, 6));
    let tiers = app.tiers().tiers;
    assert_eq!(tiers.len(), 6);
    assert_eq!(tiers[1].name, "Developing");
    assert_eq!(tiers[1].floor, 2_000.0);
    assert_eq!(tiers[5].ceiling, 1_000_000.0);
}
