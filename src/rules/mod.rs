//! Validation rules applied to a single advisory record.
//!
//! Each submodule owns one concern and reports through [`Diagnostics`]:
//! - [`schema`]: allowed and required keys
//! - [`reference`]: `composer://` reference, file location binding, repository lookup
//! - [`cve`]: CVE identifier shape and file name binding
//! - [`branches`]: branch names, `time`, `versions` shape
//! - [`versions`]: constraint grammar, bound counts, cross-branch overlap

pub mod branches;
pub mod cve;
pub mod reference;
pub mod schema;
pub mod versions;

use crate::findings::Findings;

pub use reference::ReferenceResolver;

/// Findings sink scoped to one record.
pub struct Diagnostics<'a> {
    path: &'a str,
    findings: &'a mut Findings,
}

impl<'a> Diagnostics<'a> {
    pub fn new(path: &'a str, findings: &'a mut Findings) -> Self {
        Self { path, findings }
    }

    /// Path of the record under validation.
    pub fn path(&self) -> &str {
        self.path
    }

    pub fn report(&mut self, message: impl Into<String>) {
        self.findings.push(self.path, message);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Diagnostics;
    use crate::findings::Findings;

    /// Runs `check` against a scratch sink and returns the messages it produced.
    pub fn collect(path: &str, check: impl FnOnce(&mut Diagnostics<'_>)) -> Vec<String> {
        let mut findings = Findings::new();
        check(&mut Diagnostics::new(path, &mut findings));
        findings.messages(path).to_vec()
    }
}
