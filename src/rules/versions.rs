//! Version constraint checks.
//!
//! A branch lists directional constraints such as `>=1.0.0` and `<1.4.2`.
//! Every branch needs exactly one upper bound and at most one lower bound.
//! Branches may omit the lower bound ("everything below X") only when all
//! such branches of the record share the same upper bound; otherwise their
//! ranges overlap.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Node;
use crate::rules::Diagnostics;

static CONSTRAINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(<|<=|>|>=)\d+(\.\d+)*(-(alpha|beta|rc|p|patch)\d+)?$")
        .expect("constraint pattern compiles")
});

/// Direction of a constraint, judged by its leading operator only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Upper,
    Lower,
    Unknown,
}

impl Bound {
    pub fn of(constraint: &str) -> Self {
        if constraint.starts_with('<') {
            Bound::Upper
        } else if constraint.starts_with('>') {
            Bound::Lower
        } else {
            Bound::Unknown
        }
    }
}

/// Lexical check of a single constraint.
pub fn is_well_formed(constraint: &str) -> bool {
    CONSTRAINT_RE.is_match(constraint)
}

/// Record-wide state for the lower-bound omission rule.
///
/// The first branch without a lower bound (and with an upper bound) fixes the
/// reference upper bound; every later branch without a lower bound must match
/// it.
#[derive(Debug, Default)]
pub struct OverlapTracker {
    reference: Option<String>,
}

impl OverlapTracker {
    /// Registers a branch that has no lower bound. Returns `true` when its
    /// upper bound differs from the reference, i.e. the ranges would overlap.
    pub fn omits_lower_bound(&mut self, upper: Option<&str>) -> bool {
        if self.reference.is_none() {
            self.reference = upper.map(str::to_string);
        }
        self.reference.as_deref() != upper
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

/// Checks one branch's `versions` sequence.
pub fn check_versions(
    branch_name: &str,
    versions: &[Node],
    tracker: &mut OverlapTracker,
    out: &mut Diagnostics<'_>,
) {
    let mut upper: Option<&str> = None;
    let mut has_lower = false;

    for node in versions {
        let Some(constraint) = node.as_str() else {
            out.report(format!(
                "Version constraint `{node}` is not in an acceptable format for branch `{branch_name}`."
            ));
            continue;
        };

        if !is_well_formed(constraint) {
            out.report(format!(
                "Version constraint `{constraint}` is not in an acceptable format for branch `{branch_name}`."
            ));
        }

        // Malformed constraints are still classified so bound counts stay meaningful.
        match Bound::of(constraint) {
            Bound::Upper if upper.is_some() => out.report(format!(
                "Multiple upper bounds for branch `{branch_name}` (`{constraint}`)."
            )),
            Bound::Upper => upper = Some(constraint),
            Bound::Lower if has_lower => out.report(format!(
                "Multiple lower bounds for branch `{branch_name}` (`{constraint}`)."
            )),
            Bound::Lower => has_lower = true,
            Bound::Unknown => {}
        }
    }

    if upper.is_none() {
        out.report(format!(
            "Versions must have an upper bound for branch `{branch_name}`."
        ));
    }

    if !has_lower && tracker.omits_lower_bound(upper) {
        out.report(match upper {
            Some(constraint) => format!(
                "Version `{constraint}` must have a lower bound for branch `{branch_name}` to avoid overlapping lower branches."
            ),
            None => format!(
                "Versions must have a lower bound for branch `{branch_name}` to avoid overlapping lower branches."
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::collect;

    fn strings(items: &[&str]) -> Vec<Node> {
        items.iter().map(|s| Node::String(s.to_string())).collect()
    }

    fn check(branch: &str, items: &[&str], tracker: &mut OverlapTracker) -> Vec<String> {
        let versions = strings(items);
        collect("a/b/x.yaml", |out| check_versions(branch, &versions, tracker, out))
    }

    #[test]
    fn test_constraint_grammar() {
        for ok in ["<2.0.0", "<=2", ">1.0", ">=1.0.0-beta1", "<3.1-rc2", "<1.0-p1", "<1.0-patch12"] {
            assert!(is_well_formed(ok), "{ok} should be accepted");
        }
        for bad in ["2.0.0", "=2.0", "<2.0.x", "< 2.0", "<2.0-dev", "<2.0-beta", "<v2.0", "<2..0", ""] {
            assert!(!is_well_formed(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_bound_classification() {
        assert_eq!(Bound::of("<=1"), Bound::Upper);
        assert_eq!(Bound::of(">garbage"), Bound::Lower);
        assert_eq!(Bound::of("=1.0"), Bound::Unknown);
    }

    #[test]
    fn test_bounded_branch_is_clean() {
        let mut tracker = OverlapTracker::default();
        assert!(check("1.0.x", &[">=1.0.0", "<2.0.0"], &mut tracker).is_empty());
        assert_eq!(tracker.reference(), None);
    }

    #[test]
    fn test_multiple_upper_bounds() {
        let mut tracker = OverlapTracker::default();
        let messages = check("2.x", &[">=1.0.0", "<2.0.0", "<3.0.0"], &mut tracker);
        assert_eq!(messages, vec!["Multiple upper bounds for branch `2.x` (`<3.0.0`)."]);
    }

    #[test]
    fn test_multiple_lower_bounds() {
        let mut tracker = OverlapTracker::default();
        let messages = check("2.x", &[">=1.0.0", ">1.5", "<2.0.0"], &mut tracker);
        assert_eq!(messages, vec!["Multiple lower bounds for branch `2.x` (`>1.5`)."]);
    }

    #[test]
    fn test_missing_upper_bound() {
        let mut tracker = OverlapTracker::default();
        let messages = check("2.x", &[">=1.0.0"], &mut tracker);
        assert_eq!(messages, vec!["Versions must have an upper bound for branch `2.x`."]);
    }

    #[test]
    fn test_malformed_constraint_still_counts_as_bound() {
        let mut tracker = OverlapTracker::default();
        let messages = check("2.x", &[">=1.0.0", "<2.0.x", "<3.0"], &mut tracker);
        assert_eq!(
            messages,
            vec![
                "Version constraint `<2.0.x` is not in an acceptable format for branch `2.x`.",
                "Multiple upper bounds for branch `2.x` (`<3.0`).",
            ]
        );
    }

    #[test]
    fn test_non_string_constraint() {
        let mut tracker = OverlapTracker::default();
        let versions = vec![Node::Integer(2), Node::String(">=1.0".into()), Node::String("<2.0".into())];
        let messages = collect("a/b/x.yaml", |out| check_versions("1.x", &versions, &mut tracker, out));
        assert_eq!(
            messages,
            vec!["Version constraint `2` is not in an acceptable format for branch `1.x`."]
        );
    }

    #[test]
    fn test_shared_upper_bound_without_lower_is_allowed() {
        let mut tracker = OverlapTracker::default();
        assert!(check("1.x", &["<2.0.0"], &mut tracker).is_empty());
        assert!(check("master", &["<2.0.0"], &mut tracker).is_empty());
        assert_eq!(tracker.reference(), Some("<2.0.0"));
    }

    #[test]
    fn test_differing_upper_bounds_without_lower_overlap() {
        let mut tracker = OverlapTracker::default();
        assert!(check("1.x", &["<1.5.0"], &mut tracker).is_empty());
        let messages = check("2.x", &["<2.5.0"], &mut tracker);
        assert_eq!(
            messages,
            vec!["Version `<2.5.0` must have a lower bound for branch `2.x` to avoid overlapping lower branches."]
        );
    }

    #[test]
    fn test_bounded_branches_do_not_disturb_reference() {
        let mut tracker = OverlapTracker::default();
        assert!(check("1.x", &["<1.5.0"], &mut tracker).is_empty());
        assert!(check("2.x", &[">=2.0.0", "<2.5.0"], &mut tracker).is_empty());
        assert!(check("3.x", &["<1.5.0"], &mut tracker).is_empty());
    }

    #[test]
    fn test_branch_without_any_bound_after_reference() {
        let mut tracker = OverlapTracker::default();
        assert!(check("1.x", &["<1.5.0"], &mut tracker).is_empty());
        let messages = check("2.x", &[], &mut tracker);
        assert_eq!(
            messages,
            vec![
                "Versions must have an upper bound for branch `2.x`.",
                "Versions must have a lower bound for branch `2.x` to avoid overlapping lower branches.",
            ]
        );
    }
}
