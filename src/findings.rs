//! Finding aggregation.

use std::collections::HashMap;

/// One reported validation failure, attached to a record path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: String,
    pub message: String,
}

/// Findings grouped by record path.
///
/// Paths keep the order in which they first reported something; messages
/// keep discovery order. Nothing is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    records: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &str, message: impl Into<String>) {
        let slot = match self.index.get(path) {
            Some(&slot) => slot,
            None => {
                self.records.push((path.to_string(), Vec::new()));
                self.index.insert(path.to_string(), self.records.len() - 1);
                self.records.len() - 1
            }
        };
        self.records[slot].1.push(message.into());
    }

    /// `true` when the pass was clean.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records with at least one finding.
    pub fn failed_records(&self) -> usize {
        self.records.len()
    }

    /// Total number of messages across all records.
    pub fn total(&self) -> usize {
        self.records.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn messages(&self, path: &str) -> &[String] {
        self.index
            .get(path)
            .map(|&slot| self.records[slot].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.records
            .iter()
            .map(|(path, messages)| (path.as_str(), messages.as_slice()))
    }

    /// Flattens the mapping into individual findings, in report order.
    pub fn to_vec(&self) -> Vec<Finding> {
        self.iter()
            .flat_map(|(path, messages)| {
                messages.iter().map(move |message| Finding {
                    path: path.to_string(),
                    message: message.clone(),
                })
            })
            .collect()
    }
}
