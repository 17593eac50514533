//! Query Pipeline Tests
//!
//! End-to-end behavior of parse -> filter -> sort -> project over an
//! in-memory store:
//! - Find-all preserves record order
//! - OR is an order-preserving union, AND an intersection
//! - Sorting is stable on duplicate keys
//! - Rejected queries yield no records
//! - Identical queries serialize identically

use courseql::api::{ApiErrorCode, QueryFacade, Response};
use courseql::schema::{Field, Record, FIELD_TABLE};
use courseql::storage::{DatasetKind, MemoryStore};

// =============================================================================
// Test Utilities
// =============================================================================

fn course(dept: &str, id: &str, title: &str, avg: f64, pass: f64) -> Record {
    Record::new()
        .with(Field::Department, dept)
        .with(Field::Id, id)
        .with(Field::Average, avg)
        .with(Field::Instructor, "smith")
        .with(Field::Title, title)
        .with(Field::Pass, pass)
        .with(Field::Fail, 3.0)
        .with(Field::Audit, 0.0)
        .with(Field::Uuid, format!("{}{}", dept, id))
}

fn sample_records() -> Vec<Record> {
    vec![
        course("cpsc", "110", "intro", 78.0, 100.0),
        course("math", "221", "algebra", 85.0, 1.0),
        course("cpsc", "221", "algorithms", 78.0, 50.0),
        course("biol", "112", "cells", 91.5, 1.0),
        course("cpsc", "310", "software", 85.0, 1.0),
    ]
}

fn facade_with(id: &str, records: Vec<Record>) -> QueryFacade<MemoryStore> {
    let mut store = MemoryStore::new();
    store
        .insert_records(id, DatasetKind::Courses, records)
        .unwrap();
    QueryFacade::new(store)
}

fn titles(records: &[Record]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r.get(Field::Title).and_then(|v| v.as_str()).unwrap())
        .collect()
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_find_all_returns_every_record_in_order() {
    let facade = facade_with("ubc", sample_records());
    let records = facade
        .perform_query("In courses dataset ubc, find all entries; show Title.")
        .unwrap();
    assert_eq!(
        titles(&records),
        vec!["intro", "algebra", "algorithms", "cells", "software"]
    );
}

#[test]
fn test_or_is_deduplicated_union_in_record_order() {
    let facade = facade_with("ubc", sample_records());
    let records = facade
        .perform_query(
            "In courses dataset ubc, find entries whose Department is \"math\" or \
             Department is \"cpsc\" or ID is \"221\"; show Title.",
        )
        .unwrap();
    assert_eq!(
        titles(&records),
        vec!["intro", "algebra", "algorithms", "software"]
    );
}

#[test]
fn test_and_requires_both_conditions() {
    let facade = facade_with("ubc", sample_records());
    let records = facade
        .perform_query(
            "In courses dataset ubc, find entries whose Department is \"cpsc\" and \
             Pass is equal to 1; show Title.",
        )
        .unwrap();
    assert_eq!(titles(&records), vec!["software"]);
}

#[test]
fn test_and_binds_tighter_than_or() {
    let facade = facade_with("ubc", sample_records());
    let records = facade
        .perform_query(
            "In courses dataset ubc, find entries whose Department is \"biol\" or \
             Department is \"cpsc\" and Average is less than 80; show Title.",
        )
        .unwrap();
    assert_eq!(titles(&records), vec!["intro", "algorithms", "cells"]);
}

#[test]
fn test_text_operators() {
    let facade = facade_with("ubc", sample_records());
    let run = |filter: &str| {
        let text = format!("In courses dataset ubc, find entries whose {}; show Title.", filter);
        titles(&facade.perform_query(&text).unwrap())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    };

    assert_eq!(run("Title includes \"al\""), vec!["algebra", "algorithms"]);
    assert_eq!(run("Title begins with \"al\""), vec!["algebra", "algorithms"]);
    assert_eq!(run("Title ends with \"s\""), vec!["algorithms", "cells"]);
    assert_eq!(run("Title does not include \"o\""), vec!["algebra", "cells"]);
    assert_eq!(run("Title is not \"intro\"").len(), 4);
}

// =============================================================================
// Sorting and Projection
// =============================================================================

#[test]
fn test_sort_is_stable_on_duplicate_keys() {
    let facade = facade_with("ubc", sample_records());
    let records = facade
        .perform_query(
            "In courses dataset ubc, find all entries; show Title, and Average; \
             sort in ascending order by Average.",
        )
        .unwrap();
    assert_eq!(
        titles(&records),
        vec!["intro", "algorithms", "algebra", "software", "cells"]
    );
}

#[test]
fn test_projection_onto_all_fields_is_identity() {
    let records = sample_records();
    let facade = facade_with("ubc", records.clone());

    let display = FIELD_TABLE
        .iter()
        .map(|def| def.name)
        .collect::<Vec<_>>();
    let (last, rest) = display.split_last().unwrap();
    let text = format!(
        "In courses dataset ubc, find all entries; show {}, and {}.",
        rest.join(", "),
        last
    );

    assert_eq!(facade.perform_query(&text).unwrap(), records);
}

// =============================================================================
// Determinism and Rejection
// =============================================================================

#[test]
fn test_rerun_is_byte_identical() {
    let facade = facade_with("ubc", sample_records());
    let text = "In courses dataset ubc, find entries whose Average is greater than 80; \
                show Department, and Average; sort in ascending order by Average.";

    let first = Response::result(&facade.perform_query(text).unwrap()).to_json();
    let second = Response::result(&facade.perform_query(text).unwrap()).to_json();
    assert_eq!(first, second);
}

#[test]
fn test_rejected_queries_return_malformed_query() {
    let facade = facade_with("ubc", sample_records());
    for text in [
        "In courses dataset ubc, find all entries; show Title",
        "In courses dataset ubc, find all entries; show Year.",
        "In courses dataset ubc, find entries whose Average is greater than \"x\"; show Title.",
        "In courses dataset ubc find all entries; show Title.",
    ] {
        let err = facade.perform_query(text).unwrap_err();
        assert_eq!(err.code(), ApiErrorCode::MalformedQuery, "{}", text);
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn test_scenario_average_above_ninety() {
    let records = [85.0, 92.0, 97.0]
        .iter()
        .enumerate()
        .map(|(i, avg)| course("cpsc", "110", &format!("t{}", i), *avg, 1.0))
        .collect();
    let facade = facade_with("rooms", records);

    let result = facade
        .perform_query(
            "In courses dataset rooms, find entries whose Average is greater than 90; \
             show Title, and Average.",
        )
        .unwrap();

    assert_eq!(
        result,
        vec![
            Record::new().with(Field::Title, "t1").with(Field::Average, 92.0),
            Record::new().with(Field::Title, "t2").with(Field::Average, 97.0),
        ]
    );
}
