use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named body sections of an abstract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    BackgroundAndAims,
    MaterialsAndMethods,
    Results,
    Conclusion,
    Disclosure,
    SupportedBy,
    ClinicalTrialRegistrationNumber,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::BackgroundAndAims,
        SectionKind::MaterialsAndMethods,
        SectionKind::Results,
        SectionKind::Conclusion,
        SectionKind::Disclosure,
        SectionKind::SupportedBy,
        SectionKind::ClinicalTrialRegistrationNumber,
    ];

    /// Snake-case name, used in tags and as the record's section key.
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::BackgroundAndAims => "background_and_aims",
            SectionKind::MaterialsAndMethods => "materials_and_methods",
            SectionKind::Results => "results",
            SectionKind::Conclusion => "conclusion",
            SectionKind::Disclosure => "disclosure",
            SectionKind::SupportedBy => "supported_by",
            SectionKind::ClinicalTrialRegistrationNumber => "clinical_trial_registration_number",
        }
    }

    /// Callout-style sections take every following text run as their body,
    /// whatever its style.
    pub fn is_callout(self) -> bool {
        matches!(
            self,
            SectionKind::Disclosure
                | SectionKind::SupportedBy
                | SectionKind::ClinicalTrialRegistrationNumber
        )
    }

    pub fn from_name(name: &str) -> Option<SectionKind> {
        SectionKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic role assigned to an element by one of the classification passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementType {
    Header,
    Footer,
    Session,
    CodeAbstract,
    SymbolText,
    Indice,
    SectionLabel(SectionKind),
    SectionText(SectionKind),
    AbstractTitle,
    AuthorTitle,
    Author,
    Institution,
    AbstractText,
    Image,
    Table,
    ImageText,
}

impl ElementType {
    pub fn is_section_label(self) -> bool {
        matches!(self, ElementType::SectionLabel(_))
    }

    fn simple_name(self) -> Option<&'static str> {
        Some(match self {
            ElementType::Header => "header",
            ElementType::Footer => "footer",
            ElementType::Session => "session",
            ElementType::CodeAbstract => "code_abstract",
            ElementType::SymbolText => "symbol_text",
            ElementType::Indice => "indice",
            ElementType::AbstractTitle => "abstract_title",
            ElementType::AuthorTitle => "author_title",
            ElementType::Author => "author",
            ElementType::Institution => "institution",
            ElementType::AbstractText => "abstract_text",
            ElementType::Image => "image",
            ElementType::Table => "table",
            ElementType::ImageText => "image_text",
            ElementType::SectionLabel(_) | ElementType::SectionText(_) => return None,
        })
    }
}

const SIMPLE_TYPES: [ElementType; 14] = [
    ElementType::Header,
    ElementType::Footer,
    ElementType::Session,
    ElementType::CodeAbstract,
    ElementType::SymbolText,
    ElementType::Indice,
    ElementType::AbstractTitle,
    ElementType::AuthorTitle,
    ElementType::Author,
    ElementType::Institution,
    ElementType::AbstractText,
    ElementType::Image,
    ElementType::Table,
    ElementType::ImageText,
];

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::SectionLabel(kind) => write!(f, "section_{}", kind.name()),
            ElementType::SectionText(kind) => write!(f, "section_{}_text", kind.name()),
            other => f.write_str(other.simple_name().unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element type `{0}`")]
pub struct UnknownElementType(pub String);

impl FromStr for ElementType {
    type Err = UnknownElementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(t) = SIMPLE_TYPES.into_iter().find(|t| t.simple_name() == Some(s)) {
            return Ok(t);
        }
        if let Some(rest) = s.strip_prefix("section_") {
            if let Some(kind) = rest.strip_suffix("_text").and_then(SectionKind::from_name) {
                return Ok(ElementType::SectionText(kind));
            }
            if let Some(kind) = SectionKind::from_name(rest) {
                return Ok(ElementType::SectionLabel(kind));
            }
        }
        Err(UnknownElementType(s.to_string()))
    }
}

impl TryFrom<String> for ElementType {
    type Error = UnknownElementType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementType> for String {
    fn from(t: ElementType) -> Self {
        t.to_string()
    }
}
