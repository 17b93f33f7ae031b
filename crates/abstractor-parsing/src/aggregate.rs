use std::collections::{BTreeMap, HashMap};

use abstractor_core::{
    AbstractRecord, Element, ElementType, Institution, SectionKind, reading_cmp,
};

use crate::ParsingError;
use crate::authors::parse_authors;
use crate::lines::group_lines;
use crate::text_processing::join_texts;

/// Build one record per abstract id, in order of first appearance.
pub fn aggregate(elements: &[Element]) -> Result<Vec<AbstractRecord>, ParsingError> {
    if elements.is_empty() {
        return Err(ParsingError::EmptyDocument);
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, elem) in elements.iter().enumerate() {
        let Some(id) = elem.abstract_id.as_deref() else {
            continue;
        };
        groups
            .entry(id)
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(i);
    }

    let records: Vec<AbstractRecord> = order
        .into_iter()
        .map(|id| {
            let mut members = groups.remove(id).unwrap_or_default();
            members.sort_by(|&a, &b| reading_cmp(&elements[a], &elements[b]));
            build_record(id, elements, &members)
        })
        .collect();

    let withdrawn = records.iter().filter(|r| r.is_withdrawn()).count();
    tracing::info!(abstracts = records.len(), withdrawn, "aggregated abstracts");
    Ok(records)
}

fn tagged<'a>(
    elements: &'a [Element],
    members: &'a [usize],
    tag: ElementType,
) -> impl Iterator<Item = &'a Element> {
    members
        .iter()
        .map(move |&i| &elements[i])
        .filter(move |e| e.has_tag(tag))
}

fn build_record(id: &str, elements: &[Element], members: &[usize]) -> AbstractRecord {
    let code = tagged(elements, members, ElementType::CodeAbstract)
        .next()
        .map(|e| e.text_str().trim().to_string());
    let title = join_texts(tagged(elements, members, ElementType::AbstractTitle).map(Element::text_str));

    AbstractRecord {
        id: id.to_string(),
        code,
        page_start: members.iter().map(|&i| elements[i].page).min(),
        page_end: members.iter().map(|&i| elements[i].page).max(),
        title,
        authors: parse_authors(author_lines(elements, members).iter().map(String::as_str)),
        institutions: institutions(elements, members),
        sections: sections(elements, members),
    }
}

/// Byline text per line: author and indice runs in x order.
fn author_lines(elements: &[Element], members: &[usize]) -> Vec<String> {
    let is_author = |e: &Element| matches!(e.tag(), Some(ElementType::Author | ElementType::AuthorTitle));
    group_lines(elements, members.iter().copied())
        .into_iter()
        .filter(|line| line.any(elements, is_author))
        .map(|line| {
            join_texts(
                line.elements(elements)
                    .filter(|e| is_author(*e) || e.has_tag(ElementType::Indice))
                    .map(Element::text_str),
            )
        })
        .collect()
}

/// Institution text keyed by the indice that opens its line. Lines without
/// a numeric indice continue the previous entry.
fn institutions(elements: &[Element], members: &[usize]) -> Vec<Institution> {
    let mut by_index: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    let mut current: Option<u32> = None;

    for line in group_lines(elements, members.iter().copied()) {
        if !line.any(elements, |e| e.has_tag(ElementType::Institution)) {
            continue;
        }
        let index = line
            .elements(elements)
            .filter(|e| e.has_tag(ElementType::Indice))
            .find_map(|e| e.text_str().trim().parse::<u32>().ok())
            .or(current)
            .unwrap_or(1);
        current = Some(index);
        by_index.entry(index).or_default().extend(
            line.elements(elements)
                .filter(|e| e.has_tag(ElementType::Institution))
                .map(Element::text_str),
        );
    }

    by_index
        .into_iter()
        .map(|(index, parts)| Institution {
            index,
            text: join_texts(parts),
        })
        .collect()
}

/// Section bodies keyed by section name. The label's own text after its
/// first colon opens the body.
fn sections(elements: &[Element], members: &[usize]) -> BTreeMap<String, String> {
    let mut parts: BTreeMap<SectionKind, Vec<&str>> = BTreeMap::new();
    let mut current: Option<SectionKind> = None;

    for &i in members {
        let elem = &elements[i];
        match elem.tag() {
            Some(ElementType::SectionLabel(kind)) => {
                current = Some(kind);
                let body = parts.entry(kind).or_default();
                if let Some((_, rest)) = elem.text_str().split_once(':') {
                    body.push(rest);
                }
            }
            Some(ElementType::SectionText(_) | ElementType::AbstractText) => {
                if let Some(kind) = current {
                    parts.entry(kind).or_default().push(elem.text_str());
                }
            }
            _ => {}
        }
    }

    parts
        .into_iter()
        .map(|(kind, texts)| (kind.name().to_string(), join_texts(texts)))
        .filter(|(_, text)| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstractor_core::{Position, Signature};

    struct Doc {
        elements: Vec<Element>,
        line: u32,
    }

    impl Doc {
        fn new() -> Self {
            Self {
                elements: Vec::new(),
                line: 0,
            }
        }

        fn line(&mut self) -> &mut Self {
            self.line += 1;
            self
        }

        fn add(&mut self, text: &str, x: f64, tag: ElementType) -> &mut Self {
            let mut e = Element::text(
                self.elements.len() as u64,
                1,
                text,
                Signature::new("STIX-Regular", 8.5, 4),
                Position::new(x, 12.0 * self.line as f64, 10.0, 10.0),
            );
            e.line_num = Some(self.line);
            e.line_id = Some(format!("p1_L{}", self.line));
            e.classify(tag);
            e.assign_abstract("abs_0001");
            self.elements.push(e);
            self
        }
    }

    #[test]
    fn test_record_fields() {
        let mut d = Doc::new();
        d.line().add("0001 ", 40.0, ElementType::CodeAbstract);
        d.line().add("Effects of ﬁbre", 40.0, ElementType::AbstractTitle);
        d.line()
            .add("A. Smith", 40.0, ElementType::AuthorTitle)
            .add("1", 80.0, ElementType::Indice)
            .add(", B. Doe", 85.0, ElementType::Author)
            .add("1,2", 120.0, ElementType::Indice)
            .add(";", 130.0, ElementType::Author);
        d.line()
            .add("1", 40.0, ElementType::Indice)
            .add("University of Pisa,", 45.0, ElementType::Institution);
        d.line().add("Pisa, Italy", 40.0, ElementType::Institution);
        d.line()
            .add("2", 40.0, ElementType::Indice)
            .add("Hospital of Rome", 45.0, ElementType::Institution);
        let results = SectionKind::Results;
        d.line()
            .add("Results: 12 patients", 40.0, ElementType::SectionLabel(results))
            .add("were enrolled.", 150.0, ElementType::SectionText(results));
        d.line().add("± 3", 40.0, ElementType::AbstractText);

        let records = aggregate(&d.elements).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "abs_0001");
        assert_eq!(r.code.as_deref(), Some("0001"));
        assert_eq!(r.title, "Effects of fibre");
        assert_eq!(r.authors.len(), 2);
        assert_eq!(r.authors[0].name, "A. Smith");
        assert_eq!(r.authors[0].indices, vec![1]);
        assert_eq!(r.authors[1].indices, vec![1, 2]);
        assert_eq!(
            r.institutions,
            vec![
                Institution {
                    index: 1,
                    text: "University of Pisa, Pisa, Italy".to_string()
                },
                Institution {
                    index: 2,
                    text: "Hospital of Rome".to_string()
                },
            ]
        );
        assert_eq!(r.sections["results"], "12 patients were enrolled. ± 3");
        assert_eq!(r.page_start, Some(1));
        assert_eq!(r.page_end, Some(1));
    }

    #[test]
    fn test_institution_without_indice_defaults_to_one() {
        let mut d = Doc::new();
        d.line().add("0001", 40.0, ElementType::CodeAbstract);
        d.line().add("Some Institute", 40.0, ElementType::Institution);
        let records = aggregate(&d.elements).unwrap();
        assert_eq!(records[0].institutions[0].index, 1);
    }

    #[test]
    fn test_repeated_label_appends_and_empty_sections_dropped() {
        let conclusion = SectionKind::Conclusion;
        let mut d = Doc::new();
        d.line().add("0001", 40.0, ElementType::CodeAbstract);
        d.line().add("Conclusion:", 40.0, ElementType::SectionLabel(conclusion));
        d.line().add("First.", 40.0, ElementType::SectionText(conclusion));
        d.line().add("Conclusions", 40.0, ElementType::SectionLabel(conclusion));
        d.line().add("Second.", 40.0, ElementType::SectionText(conclusion));
        d.line().add(
            "Results:",
            40.0,
            ElementType::SectionLabel(SectionKind::Results),
        );

        let records = aggregate(&d.elements).unwrap();
        let sections = &records[0].sections;
        assert_eq!(sections["conclusion"], "First. Second.");
        assert!(!sections.contains_key("results"));
    }

    #[test]
    fn test_first_appearance_order() {
        let mut d = Doc::new();
        d.line().add("0001", 40.0, ElementType::CodeAbstract);
        let mut second = d.elements[0].clone();
        second.id = 99;
        second.abstract_id = Some("abs_0002".to_string());
        d.elements.insert(0, second);
        let ids: Vec<String> = aggregate(&d.elements)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["abs_0002", "abs_0001"]);
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(aggregate(&[]), Err(ParsingError::EmptyDocument)));
    }
}
