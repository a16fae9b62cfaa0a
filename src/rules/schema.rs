//! Key allow-lists for records and branches.

use crate::document::Mapping;
use crate::rules::Diagnostics;

/// Keys allowed at the top level of a record.
pub const RECORD_KEYS: [&str; 6] = [
    "reference",
    "branches",
    "title",
    "link",
    "cve",
    "composer-repository",
];

/// Keys every record must carry.
pub const REQUIRED_RECORD_KEYS: [&str; 4] = ["reference", "title", "link", "branches"];

/// Keys allowed inside a branch. Both are also required; see
/// [`crate::rules::branches`].
pub const BRANCH_KEYS: [&str; 2] = ["time", "versions"];

pub fn check_record_keys(doc: &Mapping, out: &mut Diagnostics<'_>) {
    for key in doc.keys().filter(|k| !RECORD_KEYS.contains(k)) {
        out.report(format!("Key `{key}` is not supported."));
    }

    for key in REQUIRED_RECORD_KEYS {
        if !doc.contains_key(key) {
            out.report(format!("Key `{key}` is required."));
        }
    }
}

pub fn check_branch_keys(branch_name: &str, branch: &Mapping, out: &mut Diagnostics<'_>) {
    for key in branch.keys().filter(|k| !BRANCH_KEYS.contains(k)) {
        out.report(format!(
            "Key `{key}` is not supported for branch `{branch_name}`."
        ));
    }
}
