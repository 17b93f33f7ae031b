use abstractor_core::{Element, ElementType, format_abstract_id};

/// Contiguous run of elements opened by one code marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractSpan {
    pub abstract_id: String,
    /// Index of the code marker; also the first index of the span.
    pub code_index: usize,
    /// Last index of the span (inclusive).
    pub end: usize,
}

impl AbstractSpan {
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.code_index..=self.end
    }
}

/// Split elements (already in reading order) into abstract spans: each code
/// marker opens a span that runs until the element before the next marker.
/// Leading matter before the first marker belongs to no span.
pub fn compute_abstract_spans(elements: &[Element]) -> Vec<AbstractSpan> {
    let codes: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.has_tag(ElementType::CodeAbstract))
        .map(|(i, _)| i)
        .collect();

    codes
        .iter()
        .enumerate()
        .map(|(n, &start)| AbstractSpan {
            abstract_id: format_abstract_id(n + 1),
            code_index: start,
            end: codes.get(n + 1).map_or(elements.len() - 1, |&next| next - 1),
        })
        .collect()
}
