use serde::{Deserialize, Serialize};

/// One advisory file as handed over by the discovery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSource {
    pub path: String, // relative to the advisories root, `/`-separated
    pub text: String,
}

impl RecordSource {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A package entry returned by a repository search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PackageDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            url: None,
        }
    }
}

/// Body of a Composer repository `search.json` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<PackageDescriptor>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}
