use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use data_filter::ingestion::{
    load_from_path, save_to_path, CompositeObserver, FileObserver, IngestionAction, IngestionContext,
    IngestionFormat, IngestionObserver, IngestionOptions, IngestionSeverity, IngestionStats, LoadedData,
};
use data_filter::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(IngestionAction, usize)>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push((ctx.action, stats.rows));
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("data-filter-observability-{nanos}.{ext}"))
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    // Missing file -> Io error -> Critical
    let _ = load_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical]);
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        // A CSV file read as JSON is a parse error, not an I/O failure.
        format: Some(IngestionFormat::Json),
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    let _ = load_from_path("tests/fixtures/people.csv", &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_success_for_load_and_save() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let data = load_from_path("tests/fixtures/people.json", &opts).unwrap();
    let path = tmp_file("json");
    save_to_path(&path, &data, &opts).unwrap();
    let _ = std::fs::remove_file(&path);

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![(IngestionAction::Load, 4), (IngestionAction::Save, 4)]
    );
}

#[test]
fn composite_fans_out_and_file_observer_appends_lines() {
    let log_path = tmp_file("log");
    let recording = Arc::new(RecordingObserver::default());
    let mut composite = CompositeObserver::default();
    composite.push(recording.clone());
    composite.push(Arc::new(FileObserver::new(&log_path)));
    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        alert_at_or_above: IngestionSeverity::Error,
        ..Default::default()
    };

    let data = load_from_path("tests/fixtures/library.xml", &opts).unwrap();
    assert!(matches!(data, LoadedData::Tree(_)));
    let _ = load_from_path("tests/fixtures/does_not_exist.xml", &opts).unwrap_err();

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    assert_eq!(recording.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("load ok format=Xml"));
    assert!(lines[1].contains("load fail severity=Critical"));
    assert!(lines[2].contains("ALERT"));
    let _ = std::fs::remove_file(&log_path);
}
