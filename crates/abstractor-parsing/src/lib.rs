use abstractor_core::{AbstractsDocument, CoreError, ElementDocument, ParseSignatureError};
use serde_json::json;
use thiserror::Error;

pub mod aggregate;
pub mod authors;
pub mod clean;
pub mod codes;
pub mod config;
pub mod contextual;
pub mod deterministic;
mod lines;
pub mod spans;
pub mod text_processing;

pub use aggregate::aggregate;
pub use authors::parse_authors;
pub use clean::strip_headers_footers;
pub use config::{
    Heuristics, ListOverride, ParsingConfig, ParsingConfigBuilder, SignatureSet, StyleProfile,
    StyleRole,
};
pub use contextual::{ContextualReport, SpanIssue, SpanWarning, classify_contextual};
pub use deterministic::{DeterministicStats, classify_deterministic, infer_type};
pub use spans::{AbstractSpan, compute_abstract_spans};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("document has no elements")]
    EmptyDocument,
    #[error("invalid signature in style profile: {0}")]
    InvalidSignature(#[from] ParseSignatureError),
    #[error("unknown section `{0}` in style profile")]
    UnknownSection(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Runs the classification passes over an element document and records
/// their counters in its metadata.
#[derive(Debug, Clone, Default)]
pub struct AbstractParser {
    config: ParsingConfig,
}

impl AbstractParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Pass 1: signature and keyword rules.
    pub fn classify_deterministic(&self, doc: &mut ElementDocument) -> DeterministicStats {
        let stats = classify_deterministic(&mut doc.elements, &self.config);
        let typed = doc.elements.iter().filter(|e| !e.is_untagged()).count();
        doc.metadata.insert(
            "deterministic_pass".into(),
            json!({ "typed_elements": typed, "total_elements": stats.total }),
        );
        stats
    }

    /// Drop header and footer elements. Returns the number removed.
    pub fn strip_headers_footers(&self, doc: &mut ElementDocument) -> usize {
        let removed = strip_headers_footers(&mut doc.elements);
        doc.metadata.insert(
            "cleaned".into(),
            json!({ "removed": removed, "kept": doc.elements.len() }),
        );
        removed
    }

    /// Pass 2: per-abstract contextual classification.
    pub fn classify_contextual(&self, doc: &mut ElementDocument) -> Result<ContextualReport, ParsingError> {
        let report = classify_contextual(&mut doc.elements, &self.config)?;
        doc.metadata.insert(
            "contextual_pass".into(),
            json!({
                "abstracts": report.abstracts,
                "warnings": report.warnings.len(),
                "unresolved": report.unresolved().count(),
            }),
        );
        Ok(report)
    }

    /// Pass 3: build the abstract records.
    pub fn aggregate(&self, doc: &ElementDocument) -> Result<AbstractsDocument, ParsingError> {
        Ok(AbstractsDocument {
            abstracts: aggregate(&doc.elements)?,
        })
    }
}
