//! Branch-level checks: names, `time`, and the `versions` container.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::document::{Access, Mapping, Node};
use crate::rules::versions::{check_versions, OverlapTracker};
use crate::rules::{schema, Diagnostics};

static BRANCH_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\d.\-]+(\.x)?(-dev)?|master|main)$").expect("branch pattern compiles")
});

/// Offset-aware layouts accepted for `time`, tried after RFC 3339.
const ZONED_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Layouts without offset; interpreted as UTC.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn is_valid_branch_name(name: &str) -> bool {
    BRANCH_NAME_RE.is_match(name)
}

/// Parses a textual timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Outcome of reading a branch's `time` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTime {
    /// Explicit null; time checks are skipped.
    Unset,
    At(DateTime<Utc>),
    Invalid,
}

impl BranchTime {
    pub fn from_node(node: &Node) -> Self {
        match node {
            Node::Null => BranchTime::Unset,
            Node::Integer(secs) => DateTime::from_timestamp(*secs, 0)
                .map(BranchTime::At)
                .unwrap_or(BranchTime::Invalid),
            Node::String(s) => parse_timestamp(s)
                .map(BranchTime::At)
                .unwrap_or(BranchTime::Invalid),
            _ => BranchTime::Invalid,
        }
    }
}

/// Checks the `branches` mapping of a record.
///
/// A missing `branches` key is reported by the schema check; here it just
/// ends the branch checks. A value that is not a mapping is reported once
/// and no branch is inspected.
pub fn check_branches(doc: &Mapping, now: DateTime<Utc>, out: &mut Diagnostics<'_>) {
    let branches = match doc.mapping("branches") {
        Access::Found(branches) => branches,
        Access::Missing => return,
        Access::WrongType(_) => {
            out.report("Key `branches` must be a map.");
            return;
        }
    };

    let mut tracker = OverlapTracker::default();
    for (name, node) in branches.iter() {
        if !is_valid_branch_name(name) {
            out.report(format!("Invalid branch name `{name}`."));
        }

        let Some(branch) = node.as_mapping() else {
            out.report(format!("Branch `{name}` must be a map."));
            continue;
        };

        schema::check_branch_keys(name, branch, out);
        check_time(name, branch, now, out);

        match branch.sequence("versions") {
            Access::Found(versions) => check_versions(name, versions, &mut tracker, out),
            Access::Missing => {
                out.report(format!("Key `versions` is required for branch `{name}`."))
            }
            Access::WrongType(_) => {
                out.report(format!("Versions must be an array for branch `{name}`."))
            }
        }
    }
}

fn check_time(name: &str, branch: &Mapping, now: DateTime<Utc>, out: &mut Diagnostics<'_>) {
    let Some(node) = branch.get("time") else {
        out.report(format!("Key `time` is required for branch `{name}`."));
        return;
    };

    match BranchTime::from_node(node) {
        BranchTime::Unset => {}
        BranchTime::Invalid => out.report(format!(
            "Time is invalid for branch `{name}`, given `{node}`."
        )),
        BranchTime::At(at) if at > now => out.report(format!(
            "Time cannot be in the future for branch `{name}`."
        )),
        BranchTime::At(_) => {}
    }
}
