use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use data_filter::cli::{run_repl, PROMPT};
use data_filter::config::Config;
use data_filter::ingestion::LoadedData;
use data_filter::processing::ListNumericPolicy;
use data_filter::session::Session;
use data_filter::types::Value;

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("data-filter-session-{nanos}.{ext}"))
}

fn run(session: &mut Session, script: &str) -> String {
    let mut out = Vec::new();
    run_repl(session, Cursor::new(script.as_bytes()), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn names(session: &Session) -> Vec<String> {
    let records = match session.current().unwrap() {
        LoadedData::Records(rs) => rs.clone(),
        LoadedData::Table(ds) => ds.to_records(),
        LoadedData::Tree(_) => panic!("unexpected tree"),
    };
    records
        .iter()
        .filter_map(|r| r.get("name").and_then(Value::as_str).map(str::to_owned))
        .collect()
}

#[test]
fn commands_before_load_ask_for_data() {
    let mut session = Session::new(Config::default());
    let out = run(&mut session, "display\nstats\nhelp\nexit\n");
    assert_eq!(out.matches("Data not loaded. Please load data first.").count(), 2);
    assert!(out.contains("Commands:"));
}

#[test]
fn filter_sort_reset_over_json() {
    let mut session = Session::new(Config::default());
    let out = run(
        &mut session,
        "load tests/fixtures/people.json\nfilter age 30 --comparison gt\nsort age:desc\n",
    );
    assert!(out.contains("Loaded 4 records"));
    assert!(out.contains("Kept 2 of 4"));
    assert_eq!(names(&session), vec!["Alan", "Ada"]);

    run(&mut session, "filter tags math --mode all-elements\n");
    assert_eq!(names(&session), vec!["Ada"]);

    run(&mut session, "reset\nsort name --reverse\n");
    assert_eq!(names(&session), vec!["Linus", "Grace", "Alan", "Ada"]);
}

#[test]
fn csv_table_supports_string_and_list_modes() {
    let mut session = Session::new(Config::default());
    run(&mut session, "load tests/fixtures/people.csv\nfilter name A --mode starts-with\n");
    assert_eq!(names(&session), vec!["Ada", "Alan"]);

    run(&mut session, "reset\nfilter tags 2 --mode list-size --comparison gt\n");
    assert_eq!(names(&session), vec!["Linus"]);
}

#[test]
fn errors_are_reported_and_the_loop_continues() {
    let mut session = Session::new(Config::default());
    let out = run(
        &mut session,
        "load tests/fixtures/missing.json\nbogus\nload tests/fixtures/people.json\nsort nickname\nsort tags name\ndisplay --limit 1\nquit\ndisplay\n",
    );
    assert!(out.contains("error: failed to load tests/fixtures/missing.json"));
    assert!(out.contains("'bogus'"));
    assert!(out.contains("error: key 'nickname' not found in record 0"));
    assert!(out.contains("... showing 1 of 4 records"));
    // The loop stops at `quit`; the trailing `display` is never read.
    assert!(out.ends_with(PROMPT));
}

#[test]
fn stats_follow_the_current_view() {
    let mut session = Session::new(Config::default());
    let out = run(
        &mut session,
        "load tests/fixtures/people.json\nfilter active true\nstats age --json\n",
    );
    let json_start = out.find('{').unwrap();
    let json_end = out.rfind('}').unwrap();
    let stats: serde_json::Value = serde_json::from_str(&out[json_start..=json_end]).unwrap();
    assert_eq!(stats["numeric"]["age"]["min"], 36.0);
    assert_eq!(stats["numeric"]["age"]["max"], 41.0);
    assert_eq!(stats["boolean"], serde_json::json!({}));
}

#[test]
fn save_writes_the_current_view() {
    let mut session = Session::new(Config::default());
    let path = tmp_file("json");
    run(
        &mut session,
        &format!(
            "load tests/fixtures/people.csv\nfilter score 80 --comparison gt\nsave {}\n",
            path.display()
        ),
    );

    let mut reloaded = Session::new(Config::default());
    reloaded.load(&path).unwrap();
    assert_eq!(names(&reloaded), vec!["Ada", "Grace"]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn config_file_drives_display_and_stats() {
    let config = Config::load("tests/fixtures/config.toml").unwrap();
    let mut session = Session::new(config);
    session.load("tests/fixtures/people.json").unwrap();

    assert!(session.display(None).unwrap().contains("... showing 2 of 4 records"));
    assert_eq!(
        session.config().stats.list_numeric_policy,
        ListNumericPolicy::DualCount
    );
    // Under dual-count, only Alan's empty tag list reaches the numeric stats; the string lists do not.
    let stats = session.statistics(None).unwrap();
    let tags = stats.numeric_for("tags").unwrap();
    assert_eq!((tags.min, tags.max, tags.average), (0.0, 0.0, 0.0));
    assert_eq!(stats.list_for("tags").unwrap().max_size, 3);
}
