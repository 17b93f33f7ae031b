use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::element_type::ElementType;
use crate::signature::Signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Table,
}

/// Bounding box in page coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Boxes without any extent carry no usable geometry.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 || self.h > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Super,
    Sub,
}

/// Records that a small glyph was moved onto its base line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptAdjustment {
    pub kind: ScriptKind,
    pub original_y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Position>,
}

/// Classification state of an element.
///
/// Serialized as: field absent (not yet examined), `null` (examined by the
/// deterministic pass and left unresolved), or the tag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    #[default]
    Unexamined,
    Unresolved,
    Tagged(ElementType),
}

impl Classification {
    pub fn is_unexamined(&self) -> bool {
        matches!(self, Classification::Unexamined)
    }

    pub fn tag(&self) -> Option<ElementType> {
        match self {
            Classification::Tagged(t) => Some(*t),
            _ => None,
        }
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Classification::Tagged(t) => serializer.serialize_some(t),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<ElementType>::deserialize(deserializer)? {
            Some(t) => Classification::Tagged(t),
            None => Classification::Unresolved,
        })
    }
}

/// One positioned unit of the document: a merged text span, an image or a
/// table. Created by the normalizer, then only annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    #[serde(default)]
    pub position: Position,
    #[serde(default, rename = "line_position", skip_serializing_if = "Option::is_none")]
    pub column: Option<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_num: Option<u32>,
    #[serde(default)]
    pub line_start: bool,
    #[serde(default, skip_serializing_if = "Classification::is_unexamined")]
    pub element_type: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_adjustment: Option<ScriptAdjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<Vec<TableCell>>>,
    /// Media fields carried through untouched (`image_id`, `image_file`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Element {
    pub fn text(id: u64, page: u32, text: impl Into<String>, signature: Signature, position: Position) -> Self {
        Self {
            text: Some(text.into()),
            signature: Some(signature),
            ..Self::bare(id, ElementKind::Text, page, position)
        }
    }

    pub fn image(id: u64, page: u32, position: Position) -> Self {
        Self::bare(id, ElementKind::Image, page, position)
    }

    pub fn table(id: u64, page: u32, position: Position, cells: Vec<Vec<TableCell>>) -> Self {
        Self {
            cells: Some(cells),
            ..Self::bare(id, ElementKind::Table, page, position)
        }
    }

    fn bare(id: u64, kind: ElementKind, page: u32, position: Position) -> Self {
        Self {
            id,
            kind,
            page,
            text: None,
            signature: None,
            position,
            column: None,
            line_id: None,
            line_num: None,
            line_start: false,
            element_type: Classification::Unexamined,
            abstract_id: None,
            merged_count: None,
            script_adjustment: None,
            cells: None,
            extra: Map::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == ElementKind::Text
    }

    /// Text content, empty for media.
    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn tag(&self) -> Option<ElementType> {
        self.element_type.tag()
    }

    pub fn has_tag(&self, tag: ElementType) -> bool {
        self.tag() == Some(tag)
    }

    pub fn is_untagged(&self) -> bool {
        self.tag().is_none()
    }

    /// Write the element's tag. Tags are write-once: a second write with a
    /// different tag is a classification bug and trips a debug assertion;
    /// release builds keep the first tag.
    pub fn classify(&mut self, tag: ElementType) {
        match self.element_type {
            Classification::Tagged(existing) => {
                debug_assert!(
                    existing == tag,
                    "element {} already tagged `{}`, refusing `{}`",
                    self.id,
                    existing,
                    tag
                );
            }
            _ => self.element_type = Classification::Tagged(tag),
        }
    }

    /// Tag the element only if no pass has tagged it yet.
    pub fn classify_if_untagged(&mut self, tag: ElementType) -> bool {
        if self.is_untagged() {
            self.classify(tag);
            true
        } else {
            false
        }
    }

    /// Mark the element as examined without a match.
    pub fn mark_unresolved(&mut self) {
        if self.element_type.is_unexamined() {
            self.element_type = Classification::Unresolved;
        }
    }

    pub fn assign_abstract(&mut self, abstract_id: &str) {
        match &self.abstract_id {
            Some(existing) => debug_assert!(
                existing == abstract_id,
                "element {} already belongs to {}",
                self.id,
                existing
            ),
            None => self.abstract_id = Some(abstract_id.to_string()),
        }
    }

    /// Ordering key used by the classification passes: page, line, x, id.
    pub fn reading_key(&self) -> (u32, u32, f64, u64) {
        (
            self.page,
            self.line_num.unwrap_or(0),
            self.position.x,
            self.id,
        )
    }
}

/// Compare two elements by reading key (page, line number, x, id).
pub fn reading_cmp(a: &Element, b: &Element) -> Ordering {
    let (pa, la, xa, ia) = a.reading_key();
    let (pb, lb, xb, ib) = b.reading_key();
    pa.cmp(&pb)
        .then(la.cmp(&lb))
        .then(xa.total_cmp(&xb))
        .then(ia.cmp(&ib))
}

/// Sort elements into reading order.
pub fn sort_reading_order(elements: &mut [Element]) {
    elements.sort_by(reading_cmp);
}
