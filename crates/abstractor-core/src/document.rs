use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CoreError;
use crate::element::{Element, Position, TableCell};

// ── Raw token input ──

/// Text run as produced by the page decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawText {
    pub page: u32,
    pub text: String,
    pub font: String,
    pub size: f64,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    pub page: u32,
    #[serde(default)]
    pub position: Position,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub page: u32,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub cells: Vec<Vec<TableCell>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawToken {
    Text(RawText),
    Image(RawImage),
    Table(RawTable),
}

impl RawToken {
    pub fn page(&self) -> u32 {
        match self {
            RawToken::Text(t) => t.page,
            RawToken::Image(i) => i.page,
            RawToken::Table(t) => t.page,
        }
    }
}

/// Normalizer input: decoder metadata plus the flat token stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub tokens: Vec<RawToken>,
}

impl RawDocument {
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        require_list(&value, "tokens")?;
        Ok(serde_json::from_value(value)?)
    }
}

// ── Element documents ──

/// Frequency entry of the signature catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureStats {
    pub font: String,
    pub size: f64,
    pub flags: u32,
    pub count: usize,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Document exchanged between the normalizer and the classification passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementDocument {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub signature_catalog: BTreeMap<String, SignatureStats>,
    pub elements: Vec<Element>,
}

impl ElementDocument {
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        require_list(&value, "elements")?;
        Ok(serde_json::from_value(value)?)
    }
}

// ── Aggregated output ──

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub index: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractRecord {
    #[serde(rename = "abstract_id")]
    pub id: String,
    #[serde(rename = "abstract_code")]
    pub code: Option<String>,
    pub page_start: Option<u32>,
    pub page_end: Option<u32>,
    pub title: String,
    pub authors: Vec<Author>,
    pub institutions: Vec<Institution>,
    pub sections: BTreeMap<String, String>,
}

impl AbstractRecord {
    /// Withdrawn abstracts keep their slot in the book but carry no content.
    pub fn is_withdrawn(&self) -> bool {
        self.title.trim().eq_ignore_ascii_case("WITHDRAWN")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractsDocument {
    pub abstracts: Vec<AbstractRecord>,
}

impl AbstractsDocument {
    /// Records eligible for hierarchy mapping and rendering.
    pub fn active(&self) -> impl Iterator<Item = &AbstractRecord> {
        self.abstracts.iter().filter(|a| !a.is_withdrawn())
    }

    pub fn withdrawn_count(&self) -> usize {
        self.abstracts.iter().filter(|a| a.is_withdrawn()).count()
    }
}

/// `abs_0001`-style identifier for the n-th (1-based) abstract.
pub fn format_abstract_id(n: usize) -> String {
    format!("abs_{:04}", n)
}

// ── I/O ──

fn require_list(value: &Value, key: &str) -> Result<(), CoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CoreError::Schema("document root is not an object".to_string()))?;
    match obj.get(key) {
        None => Err(CoreError::Schema(format!("missing `{}` list", key))),
        Some(v) if !v.is_array() => Err(CoreError::Schema(format!("`{}` is not a list", key))),
        Some(_) => Ok(()),
    }
}

/// Read a JSON file into a generic value, failing with `MissingInput` when
/// the file does not exist.
pub fn read_json(path: &Path) -> Result<Value, CoreError> {
    if !path.exists() {
        return Err(CoreError::MissingInput(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_raw_document(path: &Path) -> Result<RawDocument, CoreError> {
    let doc = RawDocument::from_value(read_json(path)?)?;
    tracing::debug!(path = %path.display(), tokens = doc.tokens.len(), "loaded raw document");
    Ok(doc)
}

pub fn load_element_document(path: &Path) -> Result<ElementDocument, CoreError> {
    let doc = ElementDocument::from_value(read_json(path)?)?;
    tracing::debug!(path = %path.display(), elements = doc.elements.len(), "loaded element document");
    Ok(doc)
}

pub fn load_abstracts(path: &Path) -> Result<AbstractsDocument, CoreError> {
    Ok(serde_json::from_value(read_json(path)?)?)
}

/// Pretty-print `value` as JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_root_not_object() {
        let err = ElementDocument::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CoreError::Schema(_)));
    }

    #[test]
    fn test_schema_missing_elements() {
        let err = ElementDocument::from_value(json!({"metadata": {}})).unwrap_err();
        assert!(matches!(err, CoreError::Schema(msg) if msg.contains("elements")));
    }

    #[test]
    fn test_schema_elements_not_list() {
        let err = ElementDocument::from_value(json!({"elements": {"a": 1}})).unwrap_err();
        assert!(matches!(err, CoreError::Schema(msg) if msg.contains("not a list")));
    }

    #[test]
    fn test_empty_element_list_is_valid_schema() {
        let doc = ElementDocument::from_value(json!({"elements": []})).unwrap();
        assert!(doc.elements.is_empty());
    }

    #[test]
    fn test_raw_tokens_tagged_by_type() {
        let doc = RawDocument::from_value(json!({
            "tokens": [
                {"type": "text", "page": 1, "text": "0001", "font": "STIX-Bold", "size": 8.5, "flags": 20,
                 "position": {"x": 40, "y": 100, "w": 20, "h": 10}},
                {"type": "image", "page": 1, "position": {"x": 40, "y": 300, "w": 200, "h": 100},
                 "image_file": "images/p1_0.png"},
                {"type": "table", "page": 2, "cells": [[{"text": "a"}, {"text": "b"}]]}
            ]
        }))
        .unwrap();
        assert_eq!(doc.tokens.len(), 3);
        assert!(matches!(&doc.tokens[1], RawToken::Image(img) if img.extra["image_file"] == "images/p1_0.png"));
        assert!(matches!(&doc.tokens[2], RawToken::Table(t) if t.cells[0].len() == 2));
    }

    #[test]
    fn test_missing_input_file() {
        let err = read_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CoreError::MissingInput(_)));
    }

    #[test]
    fn test_write_then_load_element_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let doc = ElementDocument::default();
        write_json(&path, &doc).unwrap();
        let back = load_element_document(&path).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_withdrawn_filter() {
        let doc = AbstractsDocument {
            abstracts: vec![
                AbstractRecord {
                    id: format_abstract_id(1),
                    title: " withdrawn ".to_string(),
                    ..Default::default()
                },
                AbstractRecord {
                    id: format_abstract_id(2),
                    title: "Real title".to_string(),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(doc.withdrawn_count(), 1);
        let active: Vec<&str> = doc.active().map(|a| a.id.as_str()).collect();
        assert_eq!(active, vec!["abs_0002"]);
    }
}
