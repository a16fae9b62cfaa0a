use crate::config::ValidatorConfig;
use crate::document;
use crate::findings::Findings;
use crate::model::RecordSource;
use crate::rules::{branches, cve, schema, Diagnostics, ReferenceResolver};
use crate::traits::{RepositoryError, RepositoryFactory};
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Run-level failure. Problems with individual records are findings, not errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Package repository lookup failed while validating `{path}`: {source}")]
    Repository {
        path: String,
        #[source]
        source: RepositoryError,
    },
}

/// Applies every rule to advisory records, one record at a time.
pub struct Validator<F> {
    resolver: ReferenceResolver<F>,
    now: Option<DateTime<Utc>>,
}

impl<F: RepositoryFactory> Validator<F> {
    pub fn new(factory: F, config: &ValidatorConfig) -> Self {
        Self {
            resolver: ReferenceResolver::new(factory, &config.default_repository),
            now: None,
        }
    }

    /// Pins the instant used for the "time cannot be in the future" rule.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn resolver(&self) -> &ReferenceResolver<F> {
        &self.resolver
    }

    #[instrument(skip(self, text, findings))]
    pub async fn validate_record(
        &mut self,
        path: &str,
        text: &str,
        findings: &mut Findings,
    ) -> Result<(), ValidationError> {
        let mut out = Diagnostics::new(path, findings);

        if Path::new(path).extension().and_then(|e| e.to_str()) != Some("yaml") {
            out.report("The file extension should be `.yaml`.");
            return Ok(());
        }

        let doc = match document::parse(text) {
            Ok(doc) => doc,
            Err(e) => {
                out.report(format!("The document is not valid: `{e}`."));
                return Ok(());
            }
        };

        schema::check_record_keys(&doc, &mut out);
        self.resolver
            .check(&doc, &mut out)
            .await
            .map_err(|source| ValidationError::Repository {
                path: path.to_string(),
                source,
            })?;
        cve::check_cve(&doc, &mut out);
        branches::check_branches(&doc, self.now.unwrap_or_else(Utc::now), &mut out);

        debug!("Record checked");
        Ok(())
    }

    /// Validates all records in order and returns the aggregated findings.
    ///
    /// # Errors
    ///
    /// Aborts on the first repository failure; findings gathered up to that
    /// point are discarded with the run.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn validate_all(
        &mut self,
        records: &[RecordSource],
    ) -> Result<Findings, ValidationError> {
        info!("Starting advisory validation");

        let mut findings = Findings::new();
        for record in records {
            self.validate_record(&record.path, &record.text, &mut findings)
                .await?;
        }

        info!(
            failed = findings.failed_records(),
            findings = findings.total(),
            repositories = self.resolver.repositories(),
            "Finished advisory validation"
        );
        Ok(findings)
    }
}
