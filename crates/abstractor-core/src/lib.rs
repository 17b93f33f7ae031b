use std::path::PathBuf;

use thiserror::Error;

pub mod config_file;
pub mod document;
pub mod element;
pub mod element_type;
pub mod signature;

pub use config_file::{ConfigFile, HeuristicsSection, LayoutSection, ProfileSection};
pub use document::{
    AbstractRecord, AbstractsDocument, Author, ElementDocument, Institution, RawDocument,
    RawImage, RawTable, RawText, RawToken, SignatureStats, format_abstract_id,
};
pub use element::{
    Classification, Column, Element, ElementKind, Position, ScriptAdjustment, ScriptKind,
    TableCell, reading_cmp, sort_reading_order,
};
pub use element_type::{ElementType, SectionKind};
pub use signature::{ParseSignatureError, Signature};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("input not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
