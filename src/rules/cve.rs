//! CVE identifier checks.

use std::path::Path;

use crate::document::Mapping;
use crate::rules::Diagnostics;

pub const CVE_PREFIX: &str = "CVE-";

/// File name without extension, after separator normalization.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}

/// A present, non-null `cve` must start with `CVE-` and name the file.
pub fn check_cve(doc: &Mapping, out: &mut Diagnostics<'_>) {
    let Some(node) = doc.get("cve").filter(|node| !node.is_null()) else {
        return;
    };
    let cve = node.to_string();

    if !cve.starts_with(CVE_PREFIX) {
        out.report(format!("CVE `{cve}` must start with `{CVE_PREFIX}`."));
    }

    if file_stem(out.path()) != cve {
        out.report(format!("Filename should be `{cve}.yaml`."));
    }
}
