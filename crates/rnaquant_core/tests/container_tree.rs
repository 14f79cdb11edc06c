mod common;

use common::{insert_expression, insert_quantification, two_feature_store, Fixture};
use rnaquant_core::{
    Dataset, PageRequest, PageToken, QuantificationSet, QuantificationSetId, RnaServiceError,
    StaticStoreLocator,
};

fn three_quantification_store() -> Fixture {
    let fixture = Fixture::new();
    let conn = fixture.conn();
    for (id, name) in [("rq1", "first"), ("rq2", "second"), ("rq3", "third")] {
        insert_quantification(&conn, id, name);
    }
    insert_expression(&conn, "e1", "rq1", "f1", 1.5);
    insert_expression(&conn, "e2", "rq2", "f1", 2.5);
    fixture
}

fn mounted(fixture: &Fixture) -> QuantificationSet {
    let id = QuantificationSetId::parse("ds:set").unwrap();
    QuantificationSet::new(id, fixture.path())
}

#[test]
fn quantifications_are_discovered_in_store_order() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    let names: Vec<&str> = set
        .quantifications()
        .unwrap()
        .iter()
        .map(|quantification| quantification.name())
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert_eq!(set.num_quantifications().unwrap(), 3);
    assert_eq!(
        set.quantification_by_index(1).unwrap().unwrap().id().token(),
        "ds:set:rq2"
    );
    assert!(set.quantification_by_index(3).unwrap().is_none());
}

#[test]
fn discovered_quantifications_carry_store_fields() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    let first = &set.quantifications().unwrap()[0];
    assert_eq!(first.description(), "first description");
    assert!(first.feature_set_ids().contains("fs1"));
    assert_eq!(first.read_group_ids(), ["rg1".to_string(), "rg2".to_string()]);
    assert!(first.programs().is_empty());
}

#[test]
fn discovery_result_is_cached() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);
    assert_eq!(set.num_quantifications().unwrap(), 3);

    insert_quantification(&fixture.conn(), "rq4", "fourth");
    assert_eq!(set.num_quantifications().unwrap(), 3);
}

#[test]
fn concurrent_first_access_discovers_once() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    let lengths: Vec<usize> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| set.quantifications().unwrap().len()))
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });

    assert!(lengths.iter().all(|length| *length == 3));
    let first = set.quantifications().unwrap().as_ptr();
    let second = set.quantifications().unwrap().as_ptr();
    assert_eq!(first, second);
}

#[test]
fn failed_discovery_is_retried_on_next_access() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.db");
    let set = QuantificationSet::new(QuantificationSetId::parse("ds:set").unwrap(), &path);

    assert!(matches!(
        set.quantifications(),
        Err(RnaServiceError::StoreUnavailable { .. })
    ));

    let conn = rnaquant_core::db::schema::create_store(&path).unwrap();
    insert_quantification(&conn, "rq1", "first");
    drop(conn);
    assert_eq!(set.num_quantifications().unwrap(), 1);
}

#[test]
fn quantification_pages_slice_the_cache() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    let first = set.quantifications_page(&PageRequest::first(2)).unwrap();
    assert_eq!(first.items.len(), 2);
    let next = first.next_page_token.unwrap();
    assert_eq!(next, PageToken::new(2));

    let second = set
        .quantifications_page(&PageRequest::new(next, Some(2)))
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].local_id(), "rq3");
    assert!(second.next_page_token.is_none());

    let beyond = set
        .quantifications_page(&PageRequest::new(PageToken::new(10), Some(2)))
        .unwrap();
    assert!(beyond.items.is_empty());
}

#[test]
fn resolve_quantification_reads_by_compound_id() {
    let fixture = three_quantification_store();
    let mut dataset = Dataset::new("ds").unwrap();
    dataset
        .add_quantification_set("set", fixture.path(), Some("GRCh38".to_string()))
        .unwrap();

    let quantification = dataset.resolve_quantification("ds:set:rq2").unwrap();
    assert_eq!(quantification.name(), "second");
    assert_eq!(quantification.reference_set_id(), Some("GRCh38"));
}

#[test]
fn missing_quantification_reports_its_id() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    match set.resolve_quantification("ds:set:nope") {
        Err(RnaServiceError::QuantificationNotFound(id)) => assert_eq!(id, "ds:set:nope"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unknown quantification resolved"),
    }
}

#[test]
fn foreign_set_id_never_reaches_the_store() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    assert!(matches!(
        set.resolve_quantification("ds:other:rq1"),
        Err(RnaServiceError::QuantificationNotFound(_))
    ));
    assert!(matches!(
        set.resolve_expression_level("other:set:rq1:e1"),
        Err(RnaServiceError::ExpressionLevelNotFound(_))
    ));
}

#[test]
fn malformed_ids_report_depth() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    match set.resolve_quantification("ds:set") {
        Err(RnaServiceError::MalformedIdentifier {
            expected_depth,
            actual_depth,
            ..
        }) => {
            assert_eq!(expected_depth, 3);
            assert_eq!(actual_depth, 2);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed id resolved"),
    }
}

#[test]
fn resolve_expression_level_checks_the_owning_quantification() {
    let fixture = three_quantification_store();
    let set = mounted(&fixture);

    let level = set.resolve_expression_level("ds:set:rq1:e1").unwrap();
    assert_eq!(level.feature_id(), "f1");
    assert_eq!(level.id().parent().token(), "ds:set:rq1");

    assert!(matches!(
        set.resolve_expression_level("ds:set:rq2:e1"),
        Err(RnaServiceError::ExpressionLevelNotFound(_))
    ));
    assert!(matches!(
        set.resolve_expression_level("ds:set:rq1:missing"),
        Err(RnaServiceError::ExpressionLevelNotFound(_))
    ));
}

#[test]
fn dataset_routes_by_set_prefix() {
    let first = two_feature_store();
    let second = three_quantification_store();
    let mut dataset = Dataset::new("ds").unwrap();
    dataset.add_quantification_set("a", first.path(), None).unwrap();
    dataset.add_quantification_set("b", second.path(), None).unwrap();

    assert_eq!(dataset.quantification_sets().len(), 2);
    assert_eq!(dataset.quantification_set_by_name("b").unwrap().name(), "b");
    assert_eq!(
        dataset.resolve_set("ds:b").unwrap().num_quantifications().unwrap(),
        3
    );
    assert_eq!(
        dataset.resolve_quantification("ds:b:rq3").unwrap().name(),
        "third"
    );
    assert!(matches!(
        dataset.resolve_quantification("ds:a:rq3"),
        Err(RnaServiceError::QuantificationNotFound(_))
    ));
    assert!(matches!(
        dataset.quantification_set("ds:c"),
        Err(RnaServiceError::RnaQuantificationSetNotFound(_))
    ));
}

#[test]
fn duplicate_set_names_are_rejected() {
    let fixture = two_feature_store();
    let mut dataset = Dataset::new("ds").unwrap();
    dataset.add_quantification_set("a", fixture.path(), None).unwrap();

    match dataset.add_quantification_set("a", fixture.path(), None) {
        Err(RnaServiceError::DuplicateQuantificationSet(id)) => assert_eq!(id, "ds:a"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("duplicate set added"),
    }
    assert_eq!(dataset.quantification_sets().len(), 1);
}

#[test]
fn locator_supplies_store_locations() {
    let fixture = two_feature_store();
    let mut locator = StaticStoreLocator::new();
    locator.insert("ds", "located", fixture.path());
    let mut dataset = Dataset::new("ds").unwrap();

    let set = dataset
        .load_quantification_set("located", &locator, Some("hg19".to_string()))
        .unwrap();
    assert_eq!(set.store_location(), fixture.path());
    assert_eq!(set.reference_set_id(), Some("hg19"));

    assert!(matches!(
        dataset.load_quantification_set("unknown", &locator, None),
        Err(RnaServiceError::RnaQuantificationSetNotFound(_))
    ));
}

#[test]
fn set_names_with_delimiter_are_rejected() {
    let fixture = two_feature_store();
    let mut dataset = Dataset::new("ds").unwrap();

    assert!(matches!(
        dataset.add_quantification_set("a:b", fixture.path(), None),
        Err(RnaServiceError::InvalidSegment(_))
    ));
}

#[test]
fn expression_ids_repeat_across_quantifications() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared_ids.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE RnaQuantification (
            id TEXT PRIMARY KEY, feature_set_ids TEXT, description TEXT, name TEXT,
            read_group_ids TEXT, programs TEXT
         );
         CREATE TABLE Expression (
            id TEXT, rna_quantification_id TEXT, name TEXT, feature_id TEXT,
            expression REAL, is_normalized INTEGER, raw_read_count REAL, score REAL,
            units INTEGER, conf_low REAL, conf_hi REAL
         );",
    )
    .unwrap();
    insert_quantification(&conn, "rq1", "first");
    insert_quantification(&conn, "rq2", "second");
    insert_expression(&conn, "e1", "rq1", "f1", 1.0);
    insert_expression(&conn, "e1", "rq2", "f2", 2.0);
    drop(conn);

    let mut dataset = Dataset::new("ds").unwrap();
    dataset.add_quantification_set("set", &path, None).unwrap();

    let second = dataset.resolve_expression_level("ds:set:rq2:e1").unwrap();
    assert_eq!(second.feature_id(), "f2");
    assert_eq!(second.id().token(), "ds:set:rq2:e1");

    let first = dataset.resolve_expression_level("ds:set:rq1:e1").unwrap();
    assert_eq!(first.feature_id(), "f1");

    assert!(matches!(
        dataset.resolve_expression_level("ds:set:rq3:e1"),
        Err(RnaServiceError::ExpressionLevelNotFound(_))
    ));
}

#[test]
fn unknown_set_segment_reports_the_set() {
    let fixture = three_quantification_store();
    let mut dataset = Dataset::new("ds").unwrap();
    dataset.add_quantification_set("set", fixture.path(), None).unwrap();

    match dataset.resolve_quantification("ds:missing:rq1") {
        Err(RnaServiceError::RnaQuantificationSetNotFound(id)) => assert_eq!(id, "ds:missing"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("quantification of unknown set resolved"),
    }
    match dataset.resolve_expression_level("ds:missing:rq1:e1") {
        Err(RnaServiceError::RnaQuantificationSetNotFound(id)) => assert_eq!(id, "ds:missing"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expression level of unknown set resolved"),
    }
}
