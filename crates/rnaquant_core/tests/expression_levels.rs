mod common;

use common::{counted_store, two_feature_store};
use rnaquant_core::{
    Dataset, ExpressionLevelQuery, IdFilter, PageRequest, PageToken, QuantificationSet,
    RnaServiceError,
};

fn mount(path: &std::path::Path) -> Dataset {
    let mut dataset = Dataset::new("ds").unwrap();
    dataset
        .add_quantification_set("set", path, Some("GRCh38".to_string()))
        .unwrap();
    dataset
}

fn the_set(dataset: &Dataset) -> &QuantificationSet {
    dataset.quantification_set("ds:set").unwrap()
}

fn ids(page: rnaquant_core::ExpressionLevelPage) -> Vec<String> {
    page.into_iter()
        .map(|level| level.id().local_id().to_string())
        .collect()
}

#[test]
fn threshold_filters_out_lower_expressions() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        threshold: Some(1.0),
        ..ExpressionLevelQuery::default()
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();

    assert_eq!(page.len(), 1);
    let level = &page.items()[0];
    assert_eq!(level.id().token(), "ds:set:rq1:e2");
    assert_eq!(level.feature_id(), "f2");
    assert_eq!(level.expression(), 3.0);
    assert!(level.is_normalized());
    assert_eq!(level.units(), 2);
    assert_eq!(level.confidence_interval(), (0.1, 9.9));
    assert!(page.next_page_token().is_none());
}

#[test]
fn threshold_is_inclusive() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        threshold: Some(3.0),
        ..ExpressionLevelQuery::default()
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();
    assert_eq!(ids(page), vec!["e2"]);
}

#[test]
fn empty_feature_filter_is_unrestricted() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        feature_ids: IdFilter::from_ids(Vec::<String>::new()),
        ..ExpressionLevelQuery::default()
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();
    assert_eq!(ids(page), vec!["e1", "e2"]);
}

#[test]
fn feature_filter_keeps_only_members() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        feature_ids: IdFilter::from_ids(["f1", "unknown"]),
        ..ExpressionLevelQuery::default()
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();
    assert_eq!(ids(page), vec!["e1"]);
}

#[test]
fn threshold_and_filter_combine() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        threshold: Some(1.0),
        feature_ids: IdFilter::from_ids(["f1"]),
        ..ExpressionLevelQuery::default()
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();
    assert!(page.is_empty());
}

#[test]
fn pages_cover_rows_exactly_once_in_store_order() {
    let fixture = counted_store(7);
    let dataset = mount(fixture.path());
    let set = the_set(&dataset);

    let mut seen = Vec::new();
    let mut token = PageToken::FIRST;
    let mut pages = 0;
    loop {
        let query = ExpressionLevelQuery {
            page: PageRequest::new(token, Some(3)),
            ..ExpressionLevelQuery::default()
        };
        let page = set.list_expression_levels("rq1", &query).unwrap();
        pages += 1;
        let next = page.next_page_token();
        seen.extend(ids(page));
        match next {
            Some(next) => token = next,
            None => break,
        }
    }

    let expected: Vec<String> = (0..7).map(|index| format!("e{index}")).collect();
    assert_eq!(seen, expected);
    assert_eq!(pages, 3);
}

#[test]
fn exact_multiple_of_page_size_ends_with_empty_page() {
    let fixture = counted_store(4);
    let dataset = mount(fixture.path());
    let set = the_set(&dataset);

    let first = set
        .list_expression_levels(
            "rq1",
            &ExpressionLevelQuery {
                page: PageRequest::first(4),
                ..ExpressionLevelQuery::default()
            },
        )
        .unwrap();
    assert_eq!(first.len(), 4);
    let next = first.next_page_token().unwrap();
    assert_eq!(next.offset(), 4);

    let second = set
        .list_expression_levels(
            "rq1",
            &ExpressionLevelQuery {
                page: PageRequest::new(next, Some(4)),
                ..ExpressionLevelQuery::default()
            },
        )
        .unwrap();
    assert!(second.is_empty());
    assert!(second.next_page_token().is_none());
}

#[test]
fn offset_past_the_end_is_empty() {
    let fixture = counted_store(3);
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        page: PageRequest::new(PageToken::new(50), Some(10)),
        ..ExpressionLevelQuery::default()
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();
    assert!(page.is_empty());
}

#[test]
fn zero_page_size_returns_everything_from_offset() {
    let fixture = counted_store(5);
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        page: PageRequest::new(PageToken::new(2), Some(0)),
        ..ExpressionLevelQuery::default()
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();
    assert_eq!(ids(page), vec!["e2", "e3", "e4"]);
}

#[test]
fn unknown_quantification_lists_nothing() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());

    let page = the_set(&dataset)
        .list_expression_levels("missing", &ExpressionLevelQuery::default())
        .unwrap();
    assert!(page.is_empty());
}

#[test]
fn quantification_of_another_set_is_not_found() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());
    let foreign = rnaquant_core::QuantificationId::parse("ds:other:rq1").unwrap();

    let err = the_set(&dataset)
        .list_expression_levels_of(&foreign, &ExpressionLevelQuery::default())
        .unwrap_err();
    match err {
        RnaServiceError::QuantificationNotFound(id) => assert_eq!(id, "ds:other:rq1"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stored_integer_flags_coerce_to_bool() {
    let fixture = two_feature_store();
    fixture
        .conn()
        .execute("UPDATE Expression SET is_normalized = 0 WHERE id = 'e1'", [])
        .unwrap();
    let dataset = mount(fixture.path());

    let page = the_set(&dataset)
        .list_expression_levels("rq1", &ExpressionLevelQuery::default())
        .unwrap();
    let flags: Vec<bool> = page.items().iter().map(|level| level.is_normalized()).collect();
    assert_eq!(flags, vec![false, true]);
}

#[test]
fn first_page_above_threshold_returns_only_f1() {
    let fixture = common::Fixture::new();
    let conn = fixture.conn();
    common::insert_quantification(&conn, "rq1", "first");
    common::insert_expression(&conn, "x1", "rq1", "f1", 2.0);
    common::insert_expression(&conn, "x2", "rq1", "f2", 0.1);
    drop(conn);
    let dataset = mount(fixture.path());

    let query = ExpressionLevelQuery {
        page: PageRequest::new(PageToken::FIRST, Some(10)),
        threshold: Some(1.0),
        feature_ids: IdFilter::unrestricted(),
    };
    let page = the_set(&dataset).list_expression_levels("rq1", &query).unwrap();

    let features: Vec<&str> = page.items().iter().map(|level| level.feature_id()).collect();
    assert_eq!(features, vec!["f1"]);
    assert!(page.next_page_token().is_none());
}

#[test]
fn non_finite_threshold_is_rejected() {
    let fixture = two_feature_store();
    let dataset = mount(fixture.path());

    for threshold in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let query = ExpressionLevelQuery {
            threshold: Some(threshold),
            ..ExpressionLevelQuery::default()
        };
        let result = the_set(&dataset).list_expression_levels("rq1", &query);
        assert!(matches!(result, Err(RnaServiceError::InvalidThreshold(_))));
    }
}
