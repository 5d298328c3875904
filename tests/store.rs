use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use gymbot_metrics::app::App;
use gymbot_metrics::clock::FixedClock;
use gymbot_metrics::config::ResolvedConfig;
use gymbot_metrics::domain::UserId;
use gymbot_metrics::error::GymError;
use gymbot_metrics::store::{DirStore, WorkoutStore};

fn seeded_store() -> (tempfile::TempDir, DirStore) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let store = DirStore::new_with_root(root);
    std::fs::create_dir_all(store.worksheets_dir()).unwrap();
    std::fs::write(
        store.worksheets_dir().join("5511999990000.json"),
        r#"[
            {"Data": "05/01/2026", "Exercicio": "Supino", "Carga": "40,5", "Series": 3, "Reps": 10, "Notas": ""},
            {"Data": "06/01/2026", "Exercicio": "Esteira", "Carga": 25, "Series": "", "Reps": "", "Notas": "leve"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        store.profiles_path(),
        r#"{"5511999990000": "Marina", "5511888880000": "  "}"#,
    )
    .unwrap();
    (temp, store)
}

#[test]
fn reads_worksheet_rows() {
    let (_temp, store) = seeded_store();
    let user: UserId = "5511999990000".parse().unwrap();
    let records = store.fetch_records(&user).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].len(), 6);
    assert_eq!(store.display_name(&user).unwrap().as_deref(), Some("Marina"));
}

#[test]
fn blank_display_name_is_none() {
    let (_temp, store) = seeded_store();
    let user: UserId = "5511888880000".parse().unwrap();
    assert_eq!(store.display_name(&user).unwrap(), None);
}

#[test]
fn unknown_user_is_profile_not_found() {
    let (_temp, store) = seeded_store();
    let user: UserId = "000".parse().unwrap();
    assert_matches!(store.fetch_records(&user), Err(GymError::ProfileNotFound(_)));
}

#[test]
fn missing_root_is_source_unavailable() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("absent")).unwrap();
    let store = DirStore::new_with_root(root);
    let user: UserId = "5511999990000".parse().unwrap();
    assert_matches!(
        store.fetch_records(&user),
        Err(GymError::SourceUnavailable(_))
    );
}

#[test]
fn corrupt_worksheet_is_parse_error() {
    let (_temp, store) = seeded_store();
    std::fs::write(store.worksheets_dir().join("broken.json"), "{not json").unwrap();
    let user: UserId = "broken".parse().unwrap();
    assert_matches!(store.fetch_records(&user), Err(GymError::StoreParse(_)));
}

#[test]
fn dashboard_from_disk_snapshot() {
    let (_temp, store) = seeded_store();
    let today = chrono::NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let app = App::new(store, FixedClock(today), ResolvedConfig::default());
    let dashboard = app.open("5511999990000".parse().unwrap()).unwrap();

    assert_eq!(dashboard.display_name.as_deref(), Some("Marina"));
    assert_eq!(dashboard.report.entries[0].entry.sets, Some(3));
    assert_eq!(dashboard.report.entries[1].entry.sets, None);
    assert_eq!(dashboard.report.entries[1].entry.notes.as_deref(), Some("leve"));
    // "Esteira" is not in the default English keyword set.
    assert!(!dashboard.report.entries[1].is_cardio);
    assert_eq!(dashboard.report.progression.lifetime_volume, 65.5);
}
