use std::collections::{BTreeMap, BTreeSet};

use abstractor_core::{Element, HeuristicsSection, ProfileSection, SectionKind, Signature};

use crate::ParsingError;

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Set of signatures that identify one typographic role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet(BTreeSet<Signature>);

impl SignatureSet {
    pub fn from_keys<I, S>(keys: I) -> Result<Self, ParsingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for key in keys {
            set.insert(key.as_ref().parse::<Signature>()?);
        }
        Ok(Self(set))
    }

    pub fn contains(&self, sig: &Signature) -> bool {
        self.0.contains(sig)
    }

    /// True for text elements whose signature belongs to the set.
    pub fn matches(&self, elem: &Element) -> bool {
        elem.is_text() && elem.signature.as_ref().is_some_and(|s| self.0.contains(s))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typographic roles a style profile assigns signatures to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleRole {
    Header,
    Footer,
    Session,
    SectionLabel,
    DisclosureLabel,
    CodeMarker,
    SymbolText,
    Indice,
    Title,
    BodyText,
    ScientificText,
    Caption,
}

impl StyleRole {
    pub const ALL: [StyleRole; 12] = [
        StyleRole::Header,
        StyleRole::Footer,
        StyleRole::Session,
        StyleRole::SectionLabel,
        StyleRole::DisclosureLabel,
        StyleRole::CodeMarker,
        StyleRole::SymbolText,
        StyleRole::Indice,
        StyleRole::Title,
        StyleRole::BodyText,
        StyleRole::ScientificText,
        StyleRole::Caption,
    ];

    /// Built-in signature keys of the tuned congress template.
    fn default_keys(self) -> &'static [&'static str] {
        match self {
            StyleRole::Header => &["MyriadPro-SemiCn_8.5_4"],
            StyleRole::Footer => &["Springnew-Regular3_15.0_4", "Springnew-Regular2_15.0_4"],
            StyleRole::Session => &["MyriadPro-Bold_12.0_20"],
            StyleRole::SectionLabel => &["STIX-Bold_8.5_20"],
            StyleRole::DisclosureLabel => &["STIX-Italic_8.5_6"],
            StyleRole::CodeMarker => &["STIX-Bold_8.5_20", "TimesNewRomanPS-BoldMT_8.5_20"],
            StyleRole::SymbolText => &["STIX-BoldItalic_8.5_22", "SymbolMT_8.5_0"],
            StyleRole::Indice => &[
                "STIX-Italic_5.9_7",
                "STIX-Regular_5.9_5",
                "STIX-Regular_5.9_4",
                "STIX-Bold_5.9_20",
                "STIX-Bold_5.9_21",
                "STIX-Italic_5.9_6",
                "STIX-Regular_8.5_5",
                "SymbolMT_5.9_1",
            ],
            StyleRole::Title => &["STIX-Bold_8.5_20"],
            StyleRole::BodyText => &["STIX-Regular_8.5_4"],
            StyleRole::ScientificText => &[
                "STIX-Regular_8.5_4",
                "STIX-BoldItalic_8.5_22",
                "SymbolMT_8.5_0",
            ],
            StyleRole::Caption => &["STIX-Italic_8.5_6"],
        }
    }

    fn keys_in(self, section: &ProfileSection) -> Option<&Vec<String>> {
        match self {
            StyleRole::Header => section.header.as_ref(),
            StyleRole::Footer => section.footer.as_ref(),
            StyleRole::Session => section.session.as_ref(),
            StyleRole::SectionLabel => section.section_label.as_ref(),
            StyleRole::DisclosureLabel => section.disclosure_label.as_ref(),
            StyleRole::CodeMarker => section.code_marker.as_ref(),
            StyleRole::SymbolText => section.symbol_text.as_ref(),
            StyleRole::Indice => section.indice.as_ref(),
            StyleRole::Title => section.title.as_ref(),
            StyleRole::BodyText => section.body_text.as_ref(),
            StyleRole::ScientificText => section.scientific_text.as_ref(),
            StyleRole::Caption => section.caption.as_ref(),
        }
    }
}

/// Maps each typographic role to the signatures that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleProfile {
    roles: BTreeMap<StyleRole, SignatureSet>,
}

impl StyleProfile {
    pub fn set(&self, role: StyleRole) -> &SignatureSet {
        static EMPTY: SignatureSet = SignatureSet(BTreeSet::new());
        self.roles.get(&role).unwrap_or(&EMPTY)
    }

    pub fn matches(&self, role: StyleRole, elem: &Element) -> bool {
        self.set(role).matches(elem)
    }
}

impl Default for StyleProfile {
    fn default() -> Self {
        let roles = StyleRole::ALL
            .into_iter()
            .map(|role| {
                let set = role
                    .default_keys()
                    .iter()
                    .filter_map(|k| k.parse::<Signature>().ok())
                    .collect();
                (role, SignatureSet(set))
            })
            .collect();
        Self { roles }
    }
}

/// Named toggles and margins of the contextual pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Heuristics {
    /// Body-text lines without a leading indice may open or continue an
    /// institution block.
    pub unindexed_institution_lines: bool,
    /// Detect "Supported by:" and trial-registration callouts.
    pub callout_labels: bool,
    /// Attach caption-style text below images.
    pub caption_attachment: bool,
    /// Height of the caption band below an image.
    pub caption_margin: f64,
    /// Slack added on both ends of the caption band.
    pub caption_epsilon: f64,
    /// Horizontal slack on both sides of the image.
    pub caption_x_margin: f64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            unindexed_institution_lines: true,
            callout_labels: true,
            caption_attachment: true,
            caption_margin: 60.0,
            caption_epsilon: 2.0,
            caption_x_margin: 5.0,
        }
    }
}

fn default_section_keywords() -> Vec<(String, SectionKind)> {
    [
        ("background and aims", SectionKind::BackgroundAndAims),
        ("materials and methods", SectionKind::MaterialsAndMethods),
        ("results", SectionKind::Results),
        ("conclusion", SectionKind::Conclusion),
        ("conclusions", SectionKind::Conclusion),
    ]
    .into_iter()
    .map(|(k, s)| (k.to_string(), s))
    .collect()
}

fn default_callout_prefixes() -> Vec<(String, SectionKind)> {
    vec![
        ("supported by:".to_string(), SectionKind::SupportedBy),
        (
            "clinical trial registration number:".to_string(),
            SectionKind::ClinicalTrialRegistrationNumber,
        ),
    ]
}

/// Configuration of the three classification passes.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── deterministic.rs ──
    pub(crate) profile: StyleProfile,
    /// Normalized label text -> section.
    pub(crate) section_keywords: Vec<(String, SectionKind)>,
    /// Normalized text of the disclosure label.
    pub(crate) disclosure_keyword: String,

    // ── contextual/ ──
    /// Lowercase prefixes that turn a caption-style run into a callout label.
    pub(crate) callout_prefixes: Vec<(String, SectionKind)>,
    pub(crate) heuristics: Heuristics,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            profile: StyleProfile::default(),
            section_keywords: default_section_keywords(),
            disclosure_keyword: "disclosure".to_string(),
            callout_prefixes: default_callout_prefixes(),
            heuristics: Heuristics::default(),
        }
    }
}

/// Builder for [`ParsingConfig`].
///
/// Signature keys and section names are given as strings and validated in
/// [`build()`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    roles: BTreeMap<StyleRole, Vec<String>>,
    section_keywords: ListOverride<(String, String)>,
    callout_prefixes: ListOverride<(String, String)>,
    unindexed_institution_lines: Option<bool>,
    callout_labels: Option<bool>,
    caption_attachment: Option<bool>,
    caption_margin: Option<f64>,
    caption_epsilon: Option<f64>,
    caption_x_margin: Option<f64>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every value present in the `[profile]` and `[heuristics]`
    /// sections of a config file. Keyword tables extend the defaults.
    pub fn apply_file(
        mut self,
        profile: Option<&ProfileSection>,
        heuristics: Option<&HeuristicsSection>,
    ) -> Self {
        if let Some(p) = profile {
            for role in StyleRole::ALL {
                if let Some(keys) = role.keys_in(p) {
                    self.roles.insert(role, keys.clone());
                }
            }
            if let Some(keywords) = &p.section_keywords {
                for (keyword, section) in keywords {
                    self = self.add_section_keyword(keyword, section);
                }
            }
        }
        if let Some(h) = heuristics {
            self.unindexed_institution_lines = h
                .unindexed_institution_lines
                .or(self.unindexed_institution_lines);
            self.callout_labels = h.callout_labels.or(self.callout_labels);
            self.caption_attachment = h.caption_attachment.or(self.caption_attachment);
            self.caption_margin = h.caption_margin.or(self.caption_margin);
            self.caption_epsilon = h.caption_epsilon.or(self.caption_epsilon);
            self.caption_x_margin = h.caption_x_margin.or(self.caption_x_margin);
        }
        self
    }

    /// Replace the signatures of one role.
    pub fn role<I, S>(mut self, role: StyleRole, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .insert(role, keys.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the section label keywords.
    pub fn section_keywords(mut self, keywords: Vec<(String, String)>) -> Self {
        self.section_keywords = ListOverride::Replace(keywords);
        self
    }

    /// Add a section label keyword on top of the current list.
    pub fn add_section_keyword(mut self, keyword: &str, section: &str) -> Self {
        let entry = (keyword.to_string(), section.to_string());
        self.section_keywords = match std::mem::take(&mut self.section_keywords) {
            ListOverride::Default => ListOverride::Extend(vec![entry]),
            ListOverride::Replace(mut v) => {
                v.push(entry);
                ListOverride::Replace(v)
            }
            ListOverride::Extend(mut v) => {
                v.push(entry);
                ListOverride::Extend(v)
            }
        };
        self
    }

    /// Replace the callout prefixes.
    pub fn callout_prefixes(mut self, prefixes: Vec<(String, String)>) -> Self {
        self.callout_prefixes = ListOverride::Replace(prefixes);
        self
    }

    pub fn unindexed_institution_lines(mut self, enabled: bool) -> Self {
        self.unindexed_institution_lines = Some(enabled);
        self
    }

    pub fn callout_labels(mut self, enabled: bool) -> Self {
        self.callout_labels = Some(enabled);
        self
    }

    pub fn caption_attachment(mut self, enabled: bool) -> Self {
        self.caption_attachment = Some(enabled);
        self
    }

    pub fn caption_margin(mut self, margin: f64) -> Self {
        self.caption_margin = Some(margin);
        self
    }

    pub fn caption_epsilon(mut self, epsilon: f64) -> Self {
        self.caption_epsilon = Some(epsilon);
        self
    }

    pub fn caption_x_margin(mut self, margin: f64) -> Self {
        self.caption_x_margin = Some(margin);
        self
    }

    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let defaults = ParsingConfig::default();

        let mut profile = defaults.profile;
        for (role, keys) in self.roles {
            profile.roles.insert(role, SignatureSet::from_keys(keys)?);
        }

        let section_keywords = resolve_keywords(&self.section_keywords, &defaults.section_keywords)?;
        let callout_prefixes = resolve_keywords(&self.callout_prefixes, &defaults.callout_prefixes)?;

        let d = defaults.heuristics;
        let heuristics = Heuristics {
            unindexed_institution_lines: self
                .unindexed_institution_lines
                .unwrap_or(d.unindexed_institution_lines),
            callout_labels: self.callout_labels.unwrap_or(d.callout_labels),
            caption_attachment: self.caption_attachment.unwrap_or(d.caption_attachment),
            caption_margin: self.caption_margin.unwrap_or(d.caption_margin),
            caption_epsilon: self.caption_epsilon.unwrap_or(d.caption_epsilon),
            caption_x_margin: self.caption_x_margin.unwrap_or(d.caption_x_margin),
        };

        Ok(ParsingConfig {
            profile,
            section_keywords,
            disclosure_keyword: defaults.disclosure_keyword,
            callout_prefixes,
            heuristics,
        })
    }
}

/// Resolve a keyword override, lowercasing keywords and validating section
/// names.
fn resolve_keywords(
    list: &ListOverride<(String, String)>,
    defaults: &[(String, SectionKind)],
) -> Result<Vec<(String, SectionKind)>, ParsingError> {
    let parse = |entries: &[(String, String)]| -> Result<Vec<(String, SectionKind)>, ParsingError> {
        entries
            .iter()
            .map(|(keyword, section)| {
                SectionKind::from_name(section)
                    .map(|kind| (keyword.to_lowercase(), kind))
                    .ok_or_else(|| ParsingError::UnknownSection(section.clone()))
            })
            .collect()
    };
    let parsed = match list {
        ListOverride::Default => ListOverride::Default,
        ListOverride::Replace(v) => ListOverride::Replace(parse(v)?),
        ListOverride::Extend(v) => ListOverride::Extend(parse(v)?),
    };
    Ok(parsed.resolve(defaults))
}
