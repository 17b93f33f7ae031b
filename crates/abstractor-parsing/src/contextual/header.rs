use abstractor_core::{Element, ElementType};

use crate::config::{ParsingConfig, StyleRole};
use crate::lines::Line;

/// Where the byline and the end of the author list were found, as indices
/// into the header lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct HeaderOutcome {
    pub byline: Option<usize>,
    pub semicolon: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct LineShape {
    has_title: bool,
    has_body: bool,
    starts_line: bool,
}

/// Split the header zone (the lines between the code marker and the first
/// section label) into title, byline and author list.
///
/// The title is the run of title-style lines after the code. The byline is
/// the first title-style line that is followed by a plain body line; without
/// one, the first line with body text is used and the title-style lines above
/// it become the title.
pub(super) fn classify_header(elements: &mut [Element], header: &[Line], config: &ParsingConfig) -> HeaderOutcome {
    let profile = &config.profile;
    let shapes: Vec<LineShape> = header
        .iter()
        .map(|line| LineShape {
            has_title: line.any(elements, |e| profile.matches(StyleRole::Title, e)),
            has_body: line.any(elements, |e| profile.matches(StyleRole::BodyText, e)),
            starts_line: line.any(elements, |e| e.line_start),
        })
        .collect();

    let title_spans = |line: &Line, elements: &[Element]| -> Vec<usize> {
        line.text_members(elements)
            .filter(|&i| elements[i].is_untagged() && profile.matches(StyleRole::Title, &elements[i]))
            .collect()
    };

    // (line index, element index)
    let mut candidates: Vec<(usize, usize)> = Vec::new();
    let mut byline = None;
    for (idx, shape) in shapes.iter().enumerate() {
        if !shape.has_title {
            break;
        }
        candidates.extend(title_spans(&header[idx], elements).into_iter().map(|i| (idx, i)));
        let next_is_body = shapes
            .get(idx + 1)
            .is_some_and(|next| !next.has_title && next.has_body);
        if byline.is_none() && shape.starts_line && next_is_body {
            byline = Some(idx);
        }
    }

    if byline.is_none() {
        byline = shapes.iter().position(|s| s.has_body);
        if let Some(b) = byline
            && candidates.is_empty()
        {
            for (idx, line) in header.iter().enumerate().take(b + 1) {
                candidates.extend(title_spans(line, elements).into_iter().map(|i| (idx, i)));
            }
        }
    }

    // only lines above the byline can hold the title
    for &(line, i) in &candidates {
        if byline.is_none_or(|b| line < b) {
            elements[i].classify_if_untagged(ElementType::AbstractTitle);
        }
    }

    let Some(b) = byline else {
        return HeaderOutcome::default();
    };
    for i in header[b].text_members(elements).collect::<Vec<_>>() {
        if profile.matches(StyleRole::Title, &elements[i]) {
            elements[i].classify_if_untagged(ElementType::AuthorTitle);
        }
    }

    let semicolon = (b..header.len()).find(|&idx| header[idx].text(elements).contains(';'));
    if let Some(s) = semicolon {
        for line in &header[b..=s] {
            for i in line.text_members(elements).collect::<Vec<_>>() {
                if profile.matches(StyleRole::BodyText, &elements[i]) {
                    elements[i].classify_if_untagged(ElementType::Author);
                }
            }
        }
    }

    HeaderOutcome {
        byline: Some(b),
        semicolon,
    }
}
