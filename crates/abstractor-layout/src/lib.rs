use std::collections::BTreeSet;
use std::path::Path;

use abstractor_core::{
    CoreError, Element, ElementDocument, ElementKind, RawDocument, RawToken, Signature,
};
use serde_json::{Value, json};
use thiserror::Error;

pub mod catalog;
pub mod config;
mod merge;
mod reading_order;
mod scripts;

pub use catalog::{build_signature_catalog, by_frequency};
pub use config::{LayoutConfig, LayoutConfigBuilder};
pub use scripts::ScriptStats;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Counters collected while normalizing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub tokens: usize,
    pub texts: usize,
    pub images: usize,
    pub tables: usize,
    /// Text runs absorbed into a preceding span.
    pub merged_runs: usize,
    pub lines: usize,
    pub pages: usize,
    pub scripts: ScriptStats,
}

impl NormalizeStats {
    pub fn elements(&self) -> usize {
        self.texts + self.images + self.tables
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub document: ElementDocument,
    pub stats: NormalizeStats,
}

/// Turns a raw token stream into signature-tagged spans in reading order.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: LayoutConfig,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Normalize a raw document.
    ///
    /// Pipeline:
    /// 1. Assign ids in (page, input) order and derive signatures
    /// 2. Merge consecutive same-signature runs into spans
    /// 3. Sort by (page, y)
    /// 4. Snap super/subscript glyphs onto their base line
    /// 5. Split columns, group lines, number them in reading order
    /// 6. Build the signature catalog and the metadata block
    pub fn normalize(&self, raw: RawDocument) -> Normalized {
        let mut stats = NormalizeStats {
            tokens: raw.tokens.len(),
            ..Default::default()
        };

        // Step 1
        let (texts, media) = self.build_elements(raw.tokens);

        // Step 2
        let text_runs = texts.len();
        let texts = if self.config.merge_consecutive {
            merge::merge_spans(texts, &self.config)
        } else {
            texts
        };
        stats.merged_runs = text_runs - texts.len();

        // Step 3
        let mut elements: Vec<Element> = texts.into_iter().chain(media).collect();
        elements.sort_by(|a, b| a.page.cmp(&b.page).then(a.position.y.total_cmp(&b.position.y)));

        // Step 4
        stats.scripts = scripts::attach_scripts(&mut elements, &self.config);

        // Step 5
        let (elements, lines) = reading_order::assign_reading_order(elements, &self.config);
        stats.lines = lines;

        // Step 6
        for elem in &elements {
            match elem.kind {
                ElementKind::Text => stats.texts += 1,
                ElementKind::Image => stats.images += 1,
                ElementKind::Table => stats.tables += 1,
            }
        }
        let pages: BTreeSet<u32> = elements.iter().map(|e| e.page).collect();
        stats.pages = pages.len();

        let mut metadata = raw.metadata;
        metadata.insert("extractor".into(), json!(env!("CARGO_PKG_NAME")));
        metadata.insert("version".into(), json!(env!("CARGO_PKG_VERSION")));
        metadata.insert("total_elements".into(), json!(stats.elements()));
        metadata.insert("total_texts".into(), json!(stats.texts));
        metadata.insert("total_images".into(), json!(stats.images));
        metadata.insert("total_tables".into(), json!(stats.tables));
        metadata.insert("pages_extracted".into(), json!(pages));
        metadata.insert("merge_consecutive".into(), Value::Bool(self.config.merge_consecutive));
        metadata.insert("line_metadata".into(), Value::Bool(true));
        metadata.insert(
            "superscripts_adjusted".into(),
            json!(stats.scripts.superscripts),
        );
        metadata.insert("subscripts_adjusted".into(), json!(stats.scripts.subscripts));

        let signature_catalog = build_signature_catalog(&elements);
        tracing::info!(
            elements = elements.len(),
            merged_runs = stats.merged_runs,
            lines = stats.lines,
            signatures = signature_catalog.len(),
            "normalized document"
        );

        Normalized {
            document: ElementDocument {
                metadata,
                signature_catalog,
                elements,
            },
            stats,
        }
    }

    /// Step 1: one element per token. Text runs keep input order; ids follow
    /// (page, input) order.
    fn build_elements(&self, tokens: Vec<RawToken>) -> (Vec<Element>, Vec<Element>) {
        let mut tokens = tokens;
        tokens.sort_by_key(|t| t.page());

        let mut texts = Vec::new();
        let mut media = Vec::new();
        for (id, token) in tokens.into_iter().enumerate() {
            let id = id as u64;
            match token {
                RawToken::Text(t) => {
                    let signature = Signature::new(t.font, t.size, t.flags);
                    texts.push(Element::text(id, t.page, t.text, signature, t.position));
                }
                RawToken::Image(img) => {
                    let mut elem = Element::image(id, img.page, img.position);
                    elem.extra = img.extra;
                    media.push(elem);
                }
                RawToken::Table(table) => {
                    let mut elem = Element::table(id, table.page, table.position, table.cells);
                    elem.extra = table.extra;
                    media.push(elem);
                }
            }
        }
        (texts, media)
    }
}

/// Normalize a raw token file with the default configuration.
pub fn normalize_file(path: &Path) -> Result<Normalized, LayoutError> {
    let raw = abstractor_core::document::load_raw_document(path)?;
    Ok(Normalizer::new().normalize(raw))
}
