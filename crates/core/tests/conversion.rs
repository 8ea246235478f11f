//! End-to-end tests for SSSOM -> node/edge CSV conversion.
//!
//! These tests exercise the real `MappingTransformer` with:
//! - SSSOM/TSV files written to temporary directories
//! - Real CSV output files
//! - An in-memory datasource catalog (no network I/O)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use sssom2neo_core::datasource::{DatasourceRecord, DatasourceTable};
use sssom2neo_core::errors::{ConvertError, HeaderError};
use sssom2neo_core::output::{self, OutputProfile};
use sssom2neo_core::sssom::discover_inputs;
use sssom2neo_core::transformer::{ConversionSummary, MappingTransformer};

// ===========================================================================
// Helpers
// ===========================================================================

fn fixed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

fn write_sssom(dir: &Path, name: &str, curie_map: &[(&str, &str)], local_name: Option<&str>, rows: &[[&str; 5]]) -> PathBuf {
    let mut text = String::from("# curie_map:\n");
    for (prefix, base) in curie_map {
        text.push_str(&format!("#   {prefix}: {base}\n"));
    }
    if let Some(local_name) = local_name {
        text.push_str(&format!("# local_name: {local_name}\n"));
    }
    text.push_str("subject_id\tsubject_label\tpredicate_id\tobject_id\tobject_label\n");
    for row in rows {
        text.push_str(&row.join("\t"));
        text.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

struct Output {
    nodes: Vec<Vec<String>>,
    edges: Vec<Vec<String>>,
    summary: ConversionSummary,
}

/// Run a conversion into real CSV files and read them back (header excluded).
fn run(dir: &TempDir, files: &[PathBuf], catalog: &DatasourceTable, profile: OutputProfile) -> Output {
    let nodes_path = dir.path().join("nodes.csv");
    let edges_path = dir.path().join("edges.csv");

    let summary = {
        let mut nodes = output::create_csv_writer(&nodes_path).unwrap();
        let mut edges = output::create_csv_writer(&edges_path).unwrap();
        let transformer = MappingTransformer::new(profile, catalog).with_date_source(fixed_date);
        let summary = transformer.convert(files, &mut nodes, &mut edges).unwrap();
        nodes.flush().unwrap();
        edges.flush().unwrap();
        summary
    };

    Output {
        nodes: read_csv(&nodes_path),
        edges: read_csv(&edges_path),
        summary,
    }
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

/// curie -> label, from OXO-profile node rows.
fn labels(nodes: &[Vec<String>]) -> HashMap<String, String> {
    nodes.iter().map(|row| (row[1].clone(), row[2].clone())).collect()
}

const HP_BASE: &str = "http://purl.obolibrary.org/obo/HP_";
const MONDO_BASE: &str = "http://purl.obolibrary.org/obo/MONDO_";

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn test_every_id_written_exactly_once_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.sssom.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[
            ["HP:1", "one", "skos:exactMatch", "MONDO:1", ""],
            ["HP:2", "two", "skos:exactMatch", "MONDO:1", "m1"],
            ["HP:1", "one again", "skos:broadMatch", "MONDO:2", "m2"],
        ],
    );
    let b = write_sssom(
        dir.path(),
        "b.sssom.tsv",
        &[("MONDO", MONDO_BASE)],
        Some("mondo.sssom.tsv"),
        &[
            ["MONDO:2", "", "skos:exactMatch", "HP:2", ""],
            ["MONDO:3", "three", "skos:exactMatch", "HP:3", ""],
        ],
    );

    let out = run(&dir, &[a, b], &DatasourceTable::new(), OutputProfile::Oxo);

    let mut ids: Vec<&str> = out.nodes.iter().map(|row| row[1].as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["HP:1", "HP:2", "HP:3", "MONDO:1", "MONDO:2", "MONDO:3"]);

    // one edge per data row, in file order
    assert_eq!(out.edges.len(), 5);
    assert_eq!(out.summary.edges, 5);
    let starts: Vec<&str> = out.edges.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(starts, vec!["HP:1", "HP:2", "HP:1", "MONDO:2", "MONDO:3"]);
    assert_eq!(out.edges[3][2], "MONDO");
}

#[test]
fn test_first_non_empty_label_wins() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[
            ["HP:1", "first", "skos:exactMatch", "MONDO:1", "disease"],
            ["HP:1", "second", "skos:exactMatch", "MONDO:1", "other"],
        ],
    );

    let out = run(&dir, &[a], &DatasourceTable::new(), OutputProfile::Oxo);
    let labels = labels(&out.nodes);
    assert_eq!(labels["HP:1"], "first");
    assert_eq!(labels["MONDO:1"], "disease");
    assert_eq!(out.summary.nodes_labelled, 2);
    assert_eq!(out.summary.nodes_unlabelled, 0);
}

#[test]
fn test_label_arriving_after_unlabelled_offer_is_not_used() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[["HP:1", "", "skos:exactMatch", "MONDO:1", "disease"]],
    );
    let b = write_sssom(
        dir.path(),
        "b.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[["HP:1", "Foo", "skos:exactMatch", "MONDO:9", "x"]],
    );

    let out = run(&dir, &[a, b], &DatasourceTable::new(), OutputProfile::Oxo);

    let rows: Vec<&Vec<String>> = out.nodes.iter().filter(|row| row[1] == "HP:1").collect();
    assert_eq!(rows.len(), 1);
    // written by the final flush, labelled with its own id
    assert_eq!(rows[0][2], "HP:1");
    assert_eq!(out.nodes.last().unwrap()[1], "HP:1");
    assert_eq!(out.summary.nodes_unlabelled, 1);
}

#[test]
fn test_unlabelled_node_uses_id_as_label_and_is_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[["HP:7", "", "skos:exactMatch", "ZZ:1", ""]],
    );

    let out = run(&dir, &[a], &DatasourceTable::new(), OutputProfile::Oxo);
    assert_eq!(
        out.nodes,
        vec![
            vec!["7", "HP:7", "HP:7", "http://purl.obolibrary.org/obo/HP_7", "HP"],
            vec!["1", "ZZ:1", "ZZ:1", "", "ZZ"],
        ]
    );
}

#[test]
fn test_prefix_from_later_file_resolves_pending_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[["HP:1", "one", "skos:exactMatch", "MONDO:5", ""]],
    );
    let b = write_sssom(
        dir.path(),
        "b.tsv",
        &[("MONDO", MONDO_BASE)],
        Some("mondo.sssom.tsv"),
        &[["MONDO:6", "six", "skos:exactMatch", "HP:1", ""]],
    );

    let out = run(&dir, &[a, b], &DatasourceTable::new(), OutputProfile::Oxo);
    let mondo5 = out.nodes.iter().find(|row| row[1] == "MONDO:5").unwrap();
    assert_eq!(mondo5[3], "http://purl.obolibrary.org/obo/MONDO_5");
}

#[test]
fn test_lower_case_prefix_falls_back_to_upper_case_entry() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[
            ["hp:1", "lower", "skos:exactMatch", "HP:2", "upper"],
        ],
    );

    let out = run(&dir, &[a], &DatasourceTable::new(), OutputProfile::Oxo);
    assert_eq!(out.nodes[0][3], "http://purl.obolibrary.org/obo/HP_1");
    assert_eq!(out.nodes[0][4], "hp");
    assert_eq!(out.nodes[1][3], "http://purl.obolibrary.org/obo/HP_2");
}

#[test]
fn test_edges_carry_catalog_datasource() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[["HP:1", "one", "skos:exactMatch", "MONDO:1", "m"]],
    );
    let catalog: DatasourceTable = vec![DatasourceRecord {
        prefix: "HP".into(),
        idorg_namespace: String::new(),
        title: "Human Phenotype Ontology".into(),
        description: "phenotypes".into(),
        source_type: "ONTOLOGY".into(),
        base_uri: HP_BASE.into(),
        alternative_prefixes: vec!["hp".into(), "HP".into()],
        license: String::new(),
        version_info: "v1".into(),
    }]
    .into_iter()
    .collect();

    let out = run(&dir, &[a], &catalog, OutputProfile::Oxo);
    let edge = &out.edges[0];
    assert_eq!(edge[2], "HP");
    let datasource: serde_json::Value = serde_json::from_str(&edge[3]).unwrap();
    assert_eq!(datasource["title"], "Human Phenotype Ontology");
    assert_eq!(datasource["versionInfo"], "v1");
    assert_eq!(edge[4], "ONTOLOGY");
    assert_eq!(edge[5], "RELATED");
    assert_eq!(edge[6], "2025-01-31");
    assert_eq!(out.summary.stub_datasource_files, 0);
}

#[test]
fn test_missing_curie_map_aborts_and_keeps_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        Some("hp.sssom.tsv"),
        &[["HP:1", "one", "skos:exactMatch", "MONDO:1", "m"]],
    );
    let bad = dir.path().join("b.tsv");
    std::fs::write(
        &bad,
        "# local_name: b.sssom.tsv\nsubject_id\tsubject_label\tpredicate_id\tobject_id\tobject_label\nX:1\tx\tp\tY:1\ty\n",
    )
    .unwrap();

    let edges_path = dir.path().join("edges.csv");
    let result = {
        let mut nodes: Vec<Vec<String>> = Vec::new();
        let mut edges = output::create_csv_writer(&edges_path).unwrap();
        let catalog = DatasourceTable::new();
        let transformer = MappingTransformer::new(OutputProfile::Oxo, &catalog);
        let result = transformer.convert(&[good, bad.clone()], &mut nodes, &mut edges);
        edges.flush().unwrap();
        result
    };

    match result {
        Err(ConvertError::Header(HeaderError::MissingKey { path, key })) => {
            assert_eq!(key, "curie_map");
            assert_eq!(path, bad.display().to_string());
        }
        other => panic!("expected missing curie_map, got {other:?}"),
    }
    // the first file's edge stays written
    assert_eq!(read_csv(&edges_path).len(), 1);
}

#[test]
fn test_directory_input_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    std::fs::create_dir(&inputs).unwrap();
    write_sssom(
        &inputs,
        "b.sssom.tsv",
        &[("HP", HP_BASE)],
        Some("b.sssom.tsv"),
        &[["HP:2", "two", "skos:exactMatch", "MONDO:2", "m2"]],
    );
    write_sssom(
        &inputs,
        "a.sssom.tsv",
        &[("HP", HP_BASE)],
        Some("a.sssom.tsv"),
        &[["HP:1", "one", "skos:exactMatch", "MONDO:1", "m1"]],
    );
    std::fs::write(inputs.join("README.md"), "not a mapping").unwrap();

    let files = discover_inputs(&inputs, "*.sssom.tsv").unwrap();
    let out = run(&dir, &files, &DatasourceTable::new(), OutputProfile::Oxo);

    let prefixes: Vec<&str> = out.edges.iter().map(|row| row[2].as_str()).collect();
    assert_eq!(prefixes, vec!["A", "B"]);
    assert_eq!(out.summary.files, 2);
    assert_eq!(out.summary.stub_datasource_files, 2);
}

#[test]
fn test_neo4j_import_profile_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_sssom(
        dir.path(),
        "a.tsv",
        &[("HP", HP_BASE)],
        None,
        &[["HP:1", "one", "skos:exactMatch", "MONDO:1", ""]],
    );

    let out = run(&dir, &[a], &DatasourceTable::new(), OutputProfile::Neo4jImport);
    assert_eq!(
        out.nodes,
        vec![
            vec!["HP:1", "MappedEntity", "one", "HP", "1"],
            vec!["MONDO:1", "MappedEntity", "MONDO:1", "MONDO", "1"],
        ]
    );
    assert_eq!(
        out.edges,
        vec![vec![
            "HP:1",
            "skos:exactMatch",
            "MONDO:1",
            "HP:1",
            "one",
            "skos:exactMatch",
            "MONDO:1",
            ""
        ]]
    );
}
