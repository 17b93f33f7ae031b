use abstractor_core::{Element, ElementType, SectionKind};

use crate::codes::looks_like_abstract_code;
use crate::config::{ParsingConfig, StyleRole};
use crate::text_processing::normalize_label;

/// Outcome counters of the deterministic pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeterministicStats {
    pub total: usize,
    /// Elements newly tagged by this run.
    pub typed: usize,
    /// Elements that already carried a tag.
    pub already_typed: usize,
    pub unresolved: usize,
}

fn section_keyword(config: &ParsingConfig, text: &str) -> Option<SectionKind> {
    let label = normalize_label(text);
    config
        .section_keywords
        .iter()
        .find(|(keyword, _)| *keyword == label)
        .map(|(_, kind)| *kind)
}

/// Classify one element from its signature and text alone.
///
/// Rules are tried in order; the first hit wins:
/// 1. section label signature + section keyword
/// 2. disclosure label signature + "disclosure"
/// 3. code marker signature + plausible abstract code
/// 4. session, header, footer, symbol and indice signatures
pub fn infer_type(elem: &Element, config: &ParsingConfig) -> Option<ElementType> {
    if !elem.is_text() || elem.text_str().trim().is_empty() {
        return None;
    }
    let profile = &config.profile;
    let text = elem.text_str();

    if profile.matches(StyleRole::SectionLabel, elem) {
        if let Some(kind) = section_keyword(config, text) {
            return Some(ElementType::SectionLabel(kind));
        }
    }
    if profile.matches(StyleRole::DisclosureLabel, elem)
        && normalize_label(text) == config.disclosure_keyword
    {
        return Some(ElementType::SectionLabel(SectionKind::Disclosure));
    }
    if profile.matches(StyleRole::CodeMarker, elem) && looks_like_abstract_code(text) {
        return Some(ElementType::CodeAbstract);
    }

    const BY_SIGNATURE: [(StyleRole, ElementType); 5] = [
        (StyleRole::Session, ElementType::Session),
        (StyleRole::Header, ElementType::Header),
        (StyleRole::Footer, ElementType::Footer),
        (StyleRole::SymbolText, ElementType::SymbolText),
        (StyleRole::Indice, ElementType::Indice),
    ];
    BY_SIGNATURE
        .into_iter()
        .find(|(role, _)| profile.matches(*role, elem))
        .map(|(_, tag)| tag)
}

/// Tag every element that matches a deterministic rule; mark the rest as
/// examined-but-unresolved. Already-tagged elements are left alone, so
/// running the pass twice gives the same result.
pub fn classify_deterministic(elements: &mut [Element], config: &ParsingConfig) -> DeterministicStats {
    let mut stats = DeterministicStats {
        total: elements.len(),
        ..Default::default()
    };
    for elem in elements.iter_mut() {
        if !elem.is_untagged() {
            stats.already_typed += 1;
            continue;
        }
        match infer_type(elem, config) {
            Some(tag) => {
                elem.classify(tag);
                stats.typed += 1;
            }
            None => {
                elem.mark_unresolved();
                stats.unresolved += 1;
            }
        }
    }
    tracing::info!(
        total = stats.total,
        typed = stats.typed,
        already_typed = stats.already_typed,
        unresolved = stats.unresolved,
        "deterministic pass"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstractor_core::{Classification, Position, Signature};

    fn text(id: u64, text: &str, sig: &str) -> Element {
        Element::text(
            id,
            1,
            text,
            sig.parse::<Signature>().unwrap(),
            Position::new(40.0, 100.0, 50.0, 10.0),
        )
    }

    fn infer(t: &str, sig: &str) -> Option<ElementType> {
        infer_type(&text(0, t, sig), &ParsingConfig::default())
    }

    #[test]
    fn test_section_labels() {
        assert_eq!(
            infer("Background and aims:", "STIX-Bold_8.5_20"),
            Some(ElementType::SectionLabel(SectionKind::BackgroundAndAims))
        );
        assert_eq!(
            infer("Conclusions", "STIX-Bold_8.5_20"),
            Some(ElementType::SectionLabel(SectionKind::Conclusion))
        );
        // same words in body style are not labels
        assert_eq!(infer("Results:", "STIX-Regular_8.5_4"), None);
        // a bold title mentioning a keyword is not a label
        assert_eq!(infer("Long-term results of a trial", "STIX-Bold_8.5_20"), None);
    }

    #[test]
    fn test_disclosure_label() {
        assert_eq!(
            infer("Disclosure:", "STIX-Italic_8.5_6"),
            Some(ElementType::SectionLabel(SectionKind::Disclosure))
        );
        assert_eq!(infer("Disclosure:", "STIX-Bold_8.5_20"), None);
    }

    #[test]
    fn test_codes() {
        assert_eq!(infer("0042", "STIX-Bold_8.5_20"), Some(ElementType::CodeAbstract));
        assert_eq!(
            infer("LB 12", "TimesNewRomanPS-BoldMT_8.5_20"),
            Some(ElementType::CodeAbstract)
        );
        assert_eq!(infer("0042", "STIX-Regular_8.5_4"), None);
    }

    #[test]
    fn test_signature_only_rules() {
        assert_eq!(infer("HYPERTENSION 2024", "MyriadPro-SemiCn_8.5_4"), Some(ElementType::Header));
        assert_eq!(infer("Session 1", "MyriadPro-Bold_12.0_20"), Some(ElementType::Session));
        assert_eq!(infer("e12", "Springnew-Regular2_15.0_4"), Some(ElementType::Footer));
        assert_eq!(infer("±", "SymbolMT_8.5_0"), Some(ElementType::SymbolText));
        assert_eq!(infer("1", "STIX-Regular_5.9_4"), Some(ElementType::Indice));
    }

    #[test]
    fn test_empty_text_and_media_unresolved() {
        let mut elements = vec![
            text(0, "   ", "MyriadPro-SemiCn_8.5_4"),
            Element::image(1, 1, Position::new(0.0, 0.0, 10.0, 10.0)),
        ];
        let stats = classify_deterministic(&mut elements, &ParsingConfig::default());
        assert_eq!(stats.unresolved, 2);
        assert!(elements.iter().all(|e| e.element_type == Classification::Unresolved));
    }

    #[test]
    fn test_idempotent() {
        let mut elements = vec![
            text(0, "0001", "STIX-Bold_8.5_20"),
            text(1, "Results:", "STIX-Bold_8.5_20"),
            text(2, "Body text.", "STIX-Regular_8.5_4"),
            text(3, "1", "STIX-Regular_5.9_4"),
        ];
        let config = ParsingConfig::default();
        let first = classify_deterministic(&mut elements, &config);
        assert_eq!(first.typed, 3);
        assert_eq!(first.unresolved, 1);
        let snapshot = elements.clone();

        let second = classify_deterministic(&mut elements, &config);
        assert_eq!(elements, snapshot);
        assert_eq!(second.typed, 0);
        assert_eq!(second.already_typed, 3);
        assert_eq!(second.unresolved, 1);
    }
}
