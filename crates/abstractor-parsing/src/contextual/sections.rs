use abstractor_core::{Element, ElementType, SectionKind};

use crate::config::{ParsingConfig, StyleRole};
use crate::spans::AbstractSpan;
use crate::text_processing::fold_for_prefix;

/// Promote caption-style runs that open with a callout prefix
/// ("Supported by:", trial registration) to section labels.
pub(super) fn tag_callouts(elements: &mut [Element], span: &AbstractSpan, config: &ParsingConfig) {
    for i in span.indices() {
        let elem = &elements[i];
        if !elem.is_untagged() || !config.profile.matches(StyleRole::Caption, elem) {
            continue;
        }
        let folded = fold_for_prefix(elem.text_str());
        let kind = config
            .callout_prefixes
            .iter()
            .find(|(prefix, _)| folded.starts_with(prefix.as_str()))
            .map(|(_, kind)| *kind);
        if let Some(kind) = kind {
            elements[i].classify(ElementType::SectionLabel(kind));
        }
    }
}

/// Tag the text between each section label and the next one.
///
/// Callout sections take every untagged text run. Regular sections take
/// body-style runs as section text and the remaining scientific-style runs
/// (symbols, formulas) as abstract text.
///
/// Returns false when the span has no section label at all.
pub(super) fn tag_section_bodies(elements: &mut [Element], span: &AbstractSpan, config: &ParsingConfig) -> bool {
    let labels: Vec<(usize, SectionKind)> = span
        .indices()
        .filter_map(|i| match elements[i].tag() {
            Some(ElementType::SectionLabel(kind)) => Some((i, kind)),
            _ => None,
        })
        .collect();
    if labels.is_empty() {
        return false;
    }

    let profile = &config.profile;
    for (n, &(start, kind)) in labels.iter().enumerate() {
        let end = labels.get(n + 1).map_or(span.end, |&(next, _)| next - 1);
        for elem in &mut elements[start + 1..=end] {
            if !elem.is_text() || !elem.is_untagged() {
                continue;
            }
            if kind.is_callout() || profile.matches(StyleRole::BodyText, elem) {
                elem.classify(ElementType::SectionText(kind));
            } else if profile.matches(StyleRole::ScientificText, elem) {
                elem.classify(ElementType::AbstractText);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contextual::test_support::PageBuilder;

    const BOLD: &str = "STIX-Bold_8.5_20";
    const REGULAR: &str = "STIX-Regular_8.5_4";
    const ITALIC: &str = "STIX-Italic_8.5_6";
    const SYMBOL: &str = "SymbolMT_8.5_0";

    fn span(b: &PageBuilder) -> AbstractSpan {
        AbstractSpan {
            abstract_id: "abs_0001".to_string(),
            code_index: 0,
            end: b.elements.len() - 1,
        }
    }

    #[test]
    fn test_section_zones() {
        let results = ElementType::SectionLabel(SectionKind::Results);
        let conclusion = ElementType::SectionLabel(SectionKind::Conclusion);
        let mut b = PageBuilder::new();
        b.line().span("0001", BOLD, 40.0, Some(ElementType::CodeAbstract));
        b.line()
            .span("Results:", BOLD, 40.0, Some(results))
            .span("BP fell", REGULAR, 90.0, None)
            .span("±", SYMBOL, 130.0, None)
            .span("5 mmHg.", REGULAR, 140.0, None);
        b.line()
            .span("Conclusion:", BOLD, 40.0, Some(conclusion))
            .span("It works.", REGULAR, 100.0, None);

        let span = span(&b);
        assert!(tag_section_bodies(&mut b.elements, &span, &ParsingConfig::default()));
        let tags: Vec<Option<ElementType>> = b.elements.iter().map(|e| e.tag()).collect();
        assert_eq!(
            tags,
            vec![
                Some(ElementType::CodeAbstract),
                Some(results),
                Some(ElementType::SectionText(SectionKind::Results)),
                Some(ElementType::AbstractText),
                Some(ElementType::SectionText(SectionKind::Results)),
                Some(conclusion),
                Some(ElementType::SectionText(SectionKind::Conclusion)),
            ]
        );
    }

    #[test]
    fn test_callouts_take_every_text_run() {
        let mut b = PageBuilder::new();
        b.line().span("0001", BOLD, 40.0, Some(ElementType::CodeAbstract));
        b.line()
            .span("Supported by: the Ministry of Health", ITALIC, 40.0, None)
            .span("grant 42", BOLD, 200.0, None);
        b.line().span("Clinical trial registration number: NCT01", ITALIC, 40.0, None);
        b.line().span("A figure caption", ITALIC, 40.0, None);

        let span = span(&b);
        let config = ParsingConfig::default();
        tag_callouts(&mut b.elements, &span, &config);
        assert_eq!(
            b.elements[1].tag(),
            Some(ElementType::SectionLabel(SectionKind::SupportedBy))
        );
        assert_eq!(
            b.elements[3].tag(),
            Some(ElementType::SectionLabel(SectionKind::ClinicalTrialRegistrationNumber))
        );
        assert!(b.elements[4].is_untagged());

        tag_section_bodies(&mut b.elements, &span, &config);
        assert_eq!(
            b.elements[2].tag(),
            Some(ElementType::SectionText(SectionKind::SupportedBy))
        );
        assert_eq!(
            b.elements[4].tag(),
            Some(ElementType::SectionText(SectionKind::ClinicalTrialRegistrationNumber))
        );
    }

    #[test]
    fn test_no_labels() {
        let mut b = PageBuilder::new();
        b.line().span("0001", BOLD, 40.0, Some(ElementType::CodeAbstract));
        b.line().span("text", REGULAR, 40.0, None);
        let span = span(&b);
        assert!(!tag_section_bodies(&mut b.elements, &span, &ParsingConfig::default()));
        assert!(b.elements[1].is_untagged());
    }
}
