use std::io::Cursor;
use std::io::Write;

use dhc_core::{DhcError, NodeId};
use dhc_trace::{Trace, UpdateKind};

fn load(text: &str) -> Result<Trace, DhcError> {
    Trace::from_reader(Cursor::new(text))
}

fn raw(nodes: &[u64]) -> Vec<NodeId> {
    nodes.iter().copied().map(NodeId::from_raw).collect()
}

#[test]
fn insertion_strips_timestamp_and_sorts_endpoints() {
    let trace = load("+ 3 1 2 77\n").expect("well-formed trace");
    assert_eq!(trace.len(), 1);
    let update = &trace.updates()[0];
    assert_eq!(update.kind, UpdateKind::Insert);
    assert_eq!(update.nodes, raw(&[1, 2, 3]));
    assert_eq!(update.timestamp, 77);
}

#[test]
fn deletion_keeps_every_token_as_endpoint() {
    let trace = load("+ 1 2 0\n- 2 1\n").expect("well-formed trace");
    let update = &trace.updates()[1];
    assert_eq!(update.kind, UpdateKind::Delete);
    assert_eq!(update.nodes, raw(&[1, 2]));
}

#[test]
fn canonical_sort_makes_deletions_match_insertions() {
    // The deletion lists its endpoints in a different order; after the
    // parse-time sort both records carry the same tuple.
    let trace = load("+ 9 4 7 0\n- 7 9 4\n").expect("well-formed trace");
    assert_eq!(trace.updates()[0].nodes, trace.updates()[1].nodes);
}

#[test]
fn statistics_cover_insertions_only() {
    let text = "+ 1 2 0\n+ 1 3 0\n+ 1 4 0\n- 1 2\n";
    let trace = load(text).expect("well-formed trace");
    assert_eq!(trace.number_of_nodes(), 4);
    // Node 1 appears in three insertions; the deletion does not reduce it.
    assert_eq!(trace.max_degree(), 3);
}

#[test]
fn single_endpoint_insertion_is_allowed() {
    let trace = load("+ 5 0\n").expect("well-formed trace");
    assert_eq!(trace.updates()[0].nodes, raw(&[5]));
    assert_eq!(trace.number_of_nodes(), 1);
}

#[test]
fn bad_prefix_fails_fast() {
    let err = load("* 1 2 0\n").expect_err("malformed");
    assert!(matches!(err, DhcError::Trace(info) if info.code == "bad-record-prefix"));
}

#[test]
fn too_few_tokens_fail_fast() {
    let err = load("+ 1\n").expect_err("malformed");
    assert!(matches!(err, DhcError::Trace(info) if info.code == "too-few-tokens"));
    let err = load("\n+ 1 2 0\n").expect_err("empty line");
    assert!(matches!(err, DhcError::Trace(info) if info.code == "too-few-tokens"));
}

#[test]
fn non_numeric_tokens_fail_fast() {
    let err = load("+ 1 x 0\n").expect_err("malformed");
    assert!(matches!(err, DhcError::Trace(ref info) if info.code == "bad-token"));
    let err = load("+ 1 2 t\n").expect_err("malformed timestamp");
    assert!(matches!(err, DhcError::Trace(ref info) if info.code == "bad-token"));
}

#[test]
fn error_context_names_the_line() {
    let err = load("+ 1 2 0\n- zz 3\n").expect_err("malformed");
    let DhcError::Trace(info) = err else {
        panic!("expected a trace error");
    };
    assert_eq!(info.context.get("line").map(String::as_str), Some("2"));
}

#[test]
fn loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "+ 1 2 0").expect("write");
    writeln!(file, "+ 2 3 1").expect("write");
    writeln!(file, "- 1 2").expect("write");
    let trace = Trace::from_path(file.path()).expect("well-formed trace");
    assert_eq!(trace.len(), 3);
    assert_eq!(trace.number_of_nodes(), 3);
}

#[test]
fn missing_file_reports_open_failure() {
    let err = Trace::from_path("/nonexistent/trace.txt").expect_err("missing file");
    assert!(matches!(err, DhcError::Trace(info) if info.code == "open-failed"));
}
