#![allow(dead_code)]

use rnaquant_core::db::schema::create_store;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary store file plus the directory that owns it.
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quant.db");
        create_store(&path).unwrap();
        Self { dir, path }
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn insert_quantification(conn: &Connection, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO RnaQuantification (id, feature_set_ids, description, name, read_group_ids, programs)
         VALUES (?1, 'fs1', ?2, ?3, 'rg1,rg2', '')",
        params![id, format!("{name} description"), name],
    )
    .unwrap();
}

pub fn insert_expression(
    conn: &Connection,
    id: &str,
    quantification_id: &str,
    feature_id: &str,
    expression: f64,
) {
    conn.execute(
        "INSERT INTO Expression
            (id, rna_quantification_id, name, feature_id, expression, is_normalized,
             raw_read_count, score, units, conf_low, conf_hi)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, 12.0, 0.5, 2, 0.1, 9.9)",
        params![id, quantification_id, format!("{id}-name"), feature_id, expression],
    )
    .unwrap();
}

/// Store with quantification `rq1` holding expressions of f1 and f2.
pub fn two_feature_store() -> Fixture {
    let fixture = Fixture::new();
    let conn = fixture.conn();
    insert_quantification(&conn, "rq1", "first");
    insert_expression(&conn, "e1", "rq1", "f1", 0.5);
    insert_expression(&conn, "e2", "rq1", "f2", 3.0);
    fixture
}

/// Store with quantification `rq1` holding `count` expressions `e0..`,
/// each with expression equal to its index.
pub fn counted_store(count: usize) -> Fixture {
    let fixture = Fixture::new();
    let conn = fixture.conn();
    insert_quantification(&conn, "rq1", "first");
    for index in 0..count {
        insert_expression(
            &conn,
            &format!("e{index}"),
            "rq1",
            &format!("f{index}"),
            index as f64,
        );
    }
    fixture
}
