use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use dhc_core::errors::{DhcError, ErrorInfo};
use dhc_core::NodeId;

/// Whether an update inserts or deletes a hyperedge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// A hyperedge insertion.
    Insert,
    /// A hyperedge deletion; the endpoints must match a still-live edge.
    Delete,
}

/// A single hyperedge update drawn from the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeUpdate {
    /// Insertion or deletion.
    pub kind: UpdateKind,
    /// Endpoints, sorted ascending at parse time.
    pub nodes: Vec<NodeId>,
    /// Timestamp carried by insertion records. Reserved; the engines do not
    /// consume it.
    pub timestamp: i64,
}

/// A finite, ordered sequence of hyperedge updates with trace statistics.
///
/// Statistics (`number_of_nodes`, `max_degree`) cover the whole trace and are
/// available before the first update is drawn; the approximate engine
/// consumes both during initialization.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    updates: Vec<EdgeUpdate>,
    number_of_nodes: usize,
    max_degree: usize,
}

impl Trace {
    /// Loads a trace from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DhcError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            DhcError::Trace(
                ErrorInfo::new("open-failed", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Loads a trace from a buffered reader.
    ///
    /// One record per line, whitespace separated. The first token is `+` or
    /// `-`; for `+` records the final token is the timestamp. Endpoints are
    /// sorted ascending before storage so a later `-` against the canonical
    /// form matches. Malformed lines fail fast.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, DhcError> {
        let mut updates = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| {
                DhcError::Trace(
                    ErrorInfo::new("read-failed", err.to_string())
                        .with_context("line", (index + 1).to_string()),
                )
            })?;
            updates.push(parse_record(&line, index + 1)?);
            if (index + 1) % 1_000_000 == 0 {
                log::info!("loaded {} trace records", index + 1);
            }
        }
        Ok(Self::from_updates(updates))
    }

    /// Builds a trace from an explicit update sequence, recomputing the
    /// statistics.
    pub fn from_updates(updates: Vec<EdgeUpdate>) -> Self {
        let mut degrees: HashMap<NodeId, usize> = HashMap::new();
        let mut max_degree = 0;
        for update in &updates {
            if update.kind == UpdateKind::Insert {
                for node in &update.nodes {
                    let entry = degrees.entry(*node).or_insert(0);
                    *entry += 1;
                    max_degree = max_degree.max(*entry);
                }
            }
        }
        Self {
            number_of_nodes: degrees.len(),
            max_degree,
            updates,
        }
    }

    /// Returns the update sequence.
    pub fn updates(&self) -> &[EdgeUpdate] {
        &self.updates
    }

    /// Iterates over the updates in order.
    pub fn iter(&self) -> impl Iterator<Item = &EdgeUpdate> {
        self.updates.iter()
    }

    /// Returns the number of updates.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns whether the trace is empty.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Number of distinct node identifiers appearing in insertions.
    pub fn number_of_nodes(&self) -> usize {
        self.number_of_nodes
    }

    /// Maximum per-node insertion count over the full trace.
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }
}

fn parse_record(line: &str, lineno: usize) -> Result<EdgeUpdate, DhcError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&sign, rest)) = tokens.split_first() else {
        return Err(trace_error("too-few-tokens", "empty record", lineno, line));
    };
    let kind = match sign {
        "+" => UpdateKind::Insert,
        "-" => UpdateKind::Delete,
        _ => {
            return Err(trace_error(
                "bad-record-prefix",
                "record must start with '+' or '-'",
                lineno,
                line,
            ))
        }
    };
    if rest.len() < 2 {
        return Err(trace_error(
            "too-few-tokens",
            "record needs at least two tokens after the sign",
            lineno,
            line,
        ));
    }

    let (endpoint_tokens, timestamp) = match kind {
        UpdateKind::Insert => {
            let (last, endpoints) = rest.split_last().expect("length checked above");
            let timestamp: i64 = last.parse().map_err(|_| {
                trace_error("bad-token", "timestamp is not an integer", lineno, line)
            })?;
            (endpoints, timestamp)
        }
        UpdateKind::Delete => (rest, 0),
    };

    let mut nodes = Vec::with_capacity(endpoint_tokens.len());
    for token in endpoint_tokens {
        let raw: u64 = token.parse().map_err(|_| {
            trace_error("bad-token", "node identifier is not an integer", lineno, line)
        })?;
        nodes.push(NodeId::from_raw(raw));
    }
    nodes.sort();

    Ok(EdgeUpdate {
        kind,
        nodes,
        timestamp,
    })
}

fn trace_error(code: &str, message: &str, lineno: usize, line: &str) -> DhcError {
    DhcError::Trace(
        ErrorInfo::new(code, message)
            .with_context("line", lineno.to_string())
            .with_context("record", line.trim().to_string()),
    )
}
