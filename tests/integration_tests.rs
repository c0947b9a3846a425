// JSON loading and the check command live behind the `cli` feature
#![cfg(feature = "cli")]

use fquery::cli::{self, CheckOptions, CheckResult, CliError};
use fquery::{FilterError, FilterSession, Record, Schema, TypeTag, Value};

const PHOTOS: &str = r#"[
    {"id": "/photos/mascot.jpg", "parent": "/photos", "filename": "mascot.jpg",
     "length": 48213, "focal len": 55, "exif": {"iso": 400, "model": "X100"}},
    {"id": "/photos/beach.jpg", "parent": "/photos", "filename": "beach.jpg",
     "length": 90112, "focal len": 55, "exif": {"iso": 100, "model": "X100"}},
    {"id": "/photos/raw/cascade.raw", "parent": "/photos/raw", "filename": "cascade.raw",
     "length": 20480, "focal len": 23},
    {"id": "/notes.txt", "filename": "notes.txt", "length": 12,
     "modified": "2021-03-04T10:30:00Z", "hidden": false}
]"#;

fn records() -> Vec<Record> {
    cli::load_records(PHOTOS).unwrap()
}

fn ids(records: &[&Record]) -> Vec<String> {
    records.iter().map(|record| record.id().to_string()).collect()
}

fn check(filters: &[&str]) -> Result<CheckResult, CliError> {
    cli::execute_check(&CheckOptions {
        filters: filters.iter().map(|f| f.to_string()).collect(),
        input: Some(PHOTOS.to_string()),
        ..Default::default()
    })
}

// ============================================================================
// Loading records
// ============================================================================

#[test]
fn test_load_records() {
    let records = records();
    assert_eq!(records.len(), 4);

    let mascot = &records[0];
    assert_eq!(mascot.id(), "/photos/mascot.jpg");
    assert_eq!(mascot.parent(), Some("/photos"));
    assert_eq!(fquery::Node::property(mascot, "EXIF.ISO"), &Value::Integer(400));

    let notes = &records[3];
    assert_eq!(notes.parent(), None);
    assert!(matches!(
        fquery::Node::property(notes, "modified"),
        Value::DateTime(_)
    ));
}

#[test]
fn test_inferred_schema() {
    let schema = Schema::infer(&records());
    let listing = cli::list_properties(&schema, None);
    assert!(listing.contains("exif.iso"));
    assert!(listing.lines().any(|line| line.starts_with("modified") && line.ends_with("DateTime")));

    let listing = cli::list_properties(&schema, Some("exif"));
    assert_eq!(listing.lines().count(), 2);
    assert_eq!(
        cli::list_properties(&schema, Some("bitrate")),
        "No properties match 'bitrate'\n"
    );
}

#[test]
fn test_invalid_input() {
    assert!(matches!(
        cli::load_records("{\"id\": 1}"),
        Err(CliError::InvalidRecords(_))
    ));
    assert!(matches!(cli::load_records("[1, 2]"), Err(CliError::InvalidRecords(_))));
    assert!(matches!(cli::load_records("[{"), Err(CliError::Json(_))));
}

#[test]
fn test_record_round_trip_to_json() {
    let json = cli::record_to_json(&records()[3]);
    assert_eq!(json["id"], "/notes.txt");
    assert_eq!(json["modified"], "2021-03-04T10:30:00Z");
    assert_eq!(json["hidden"], false);
}

// ============================================================================
// Filter session
// ============================================================================

#[test]
fn test_session_select() {
    let records = records();
    let schema = Schema::infer(&records);
    let mut session = FilterSession::new();

    assert!(!session.is_filtered());
    assert_eq!(session.select(&records).len(), 4);

    session.apply("length < 65535", &schema).unwrap();
    assert_eq!(
        ids(&session.select(&records)),
        vec!["/photos/mascot.jpg", "/photos/raw/cascade.raw", "/notes.txt"]
    );
}

#[test]
fn test_session_add_narrows() {
    let records = records();
    let schema = Schema::infer(&records);
    let mut session = FilterSession::new();

    session.add("\"focal len\" == 55", &schema).unwrap();
    session.add("filename contains \"asc\"", &schema).unwrap();
    assert_eq!(ids(&session.select(&records)), vec!["/photos/mascot.jpg"]);
    assert_eq!(
        session.show().as_deref(),
        Some("((\"focal len\" == 55) && (\"filename\" contains asc))")
    );

    session.apply("filename contains asc", &schema).unwrap();
    assert_eq!(
        ids(&session.select(&records)),
        vec!["/photos/mascot.jpg", "/photos/raw/cascade.raw"]
    );
}

#[test]
fn test_session_error_keeps_active_filter() {
    let records = records();
    let schema = Schema::infer(&records);
    let mut session = FilterSession::new();

    session.apply("length < 65535", &schema).unwrap();
    let before = session.show();

    let err = session.add("length <", &schema).unwrap_err();
    assert!(matches!(err, FilterError::Parse(_)));
    let err = session.apply("bitrate > 3", &schema).unwrap_err();
    assert!(err.to_string().starts_with("Invalid property name: bitrate"));

    assert_eq!(session.show(), before);
    assert_eq!(session.select(&records).len(), 3);
}

#[test]
fn test_session_clear() {
    let records = records();
    let schema = Schema::infer(&records);
    let mut session = FilterSession::new();

    session.apply("length < 0", &schema).unwrap();
    assert!(session.select(&records).is_empty());
    session.clear();
    assert_eq!(session.show(), None);
    assert_eq!(session.select(&records).len(), 4);
}

#[test]
fn test_ambiguous_property_in_session() {
    let mut schema = Schema::new();
    schema.register("exif", "width", TypeTag::Integer);
    schema.register("png", "width", TypeTag::Integer);
    schema.register("fits", "width", TypeTag::Integer);

    let err = FilterSession::new().apply("width > 100", &schema).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("exif, fits, png"), "{}", message);
    assert!(message.ends_with("width > 100\n^"));
}

// ============================================================================
// Check command
// ============================================================================

#[test]
fn test_check_matches() {
    match check(&["length < 65535", "filename endswith .jpg"]).unwrap() {
        CheckResult::Matches { filter, records } => {
            assert_eq!(
                filter,
                "((\"length\" < 65535) && (\"filename\" endswith .jpg))"
            );
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id(), "/photos/mascot.jpg");
        }
        other => panic!("Expected matches, got {:?}", other),
    }
}

#[test]
fn test_check_syntax_only() {
    let result = cli::execute_check(&CheckOptions {
        filters: vec!["iso >= 100".to_string()],
        input: Some(PHOTOS.to_string()),
        syntax_only: true,
        explain: true,
    })
    .unwrap();
    match result {
        CheckResult::SyntaxValid { filter } => {
            assert_eq!(filter, "guard[exif.iso] (\"exif.iso\" >= 100)");
        }
        other => panic!("Expected syntax check, got {:?}", other),
    }
}

#[test]
fn test_check_errors() {
    assert!(matches!(check(&["length <"]), Err(CliError::Filter(_))));
    assert!(matches!(
        cli::execute_check(&CheckOptions {
            filters: vec!["length < 1".to_string()],
            ..Default::default()
        }),
        Err(CliError::NoInput)
    ));
}

const ALBUMS: &str = r#"[
    {"id": "/photos", "filename": "photos", "album": "summer"},
    {"id": "/photos/a.jpg", "parent": "/photos", "filename": "a.jpg", "length": 10},
    {"id": "/photos/b.jpg", "parent": "/photos", "filename": "b.jpg", "length": 20},
    {"id": "/other", "filename": "other", "album": "winter"},
    {"id": "/other/c.jpg", "parent": "/other", "filename": "c.jpg", "length": 30}
]"#;

fn matched_ids(input: &str, filter: &str) -> Vec<String> {
    let result = cli::execute_check(&CheckOptions {
        filters: vec![filter.to_string()],
        input: Some(input.to_string()),
        ..Default::default()
    });
    match result.unwrap() {
        CheckResult::Matches { records, .. } => {
            records.iter().map(|record| record.id().to_string()).collect()
        }
        other => panic!("Expected matches, got {:?}", other),
    }
}

#[test]
fn test_check_lists_contents_when_only_directories_match() {
    assert_eq!(
        matched_ids(ALBUMS, "album == summer"),
        vec!["/photos/a.jpg", "/photos/b.jpg"]
    );
    assert_eq!(
        matched_ids(ALBUMS, "filename contains o"),
        vec!["/photos/a.jpg", "/photos/b.jpg", "/other/c.jpg"]
    );
}

#[test]
fn test_check_keeps_directories_next_to_files() {
    // a file matched too, so nothing is expanded
    assert_eq!(
        matched_ids(ALBUMS, "filename startswith p || filename startswith b"),
        vec!["/photos", "/photos/b.jpg"]
    );
    assert!(matched_ids(ALBUMS, "album == autumn").is_empty());
    // leaves without children are never replaced
    assert_eq!(matched_ids(PHOTOS, "filename == notes.txt"), vec!["/notes.txt"]);
}

#[test]
fn test_render_matches_groups_by_parent() {
    let records = records();
    let listing = cli::render_matches(&records);
    assert_eq!(
        listing,
        "/notes.txt\n\
         /photos:\n  /photos/mascot.jpg\n  /photos/beach.jpg\n\
         /photos/raw:\n  /photos/raw/cascade.raw\n"
    );
}

// ============================================================================
// Docs
// ============================================================================

#[test]
fn test_docs() {
    assert!(cli::get_docs_overview().contains("operators"));
    assert!(cli::get_doc_topic("ops").unwrap().contains("startswith"));
    assert!(matches!(
        cli::get_doc_topic("lambdas"),
        Err(CliError::UnknownTopic(_))
    ));
}
