use std::collections::HashMap;

use abstractor_core::Element;

/// A visual line rebuilt from the `line_id` annotations of the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Line {
    pub id: String,
    pub page: u32,
    pub line_num: u32,
    /// Element indices, ordered by x.
    pub members: Vec<usize>,
}

impl Line {
    pub fn elements<'e>(&self, elements: &'e [Element]) -> impl Iterator<Item = &'e Element> {
        self.members.iter().map(move |&i| &elements[i])
    }

    /// Indices of the text members.
    pub fn text_members(&self, elements: &[Element]) -> impl Iterator<Item = usize> {
        self.members.iter().copied().filter(move |&i| elements[i].is_text())
    }

    pub fn any(&self, elements: &[Element], pred: impl Fn(&Element) -> bool) -> bool {
        self.elements(elements).any(pred)
    }

    pub fn has_section_label(&self, elements: &[Element]) -> bool {
        self.any(elements, |e| e.tag().is_some_and(|t| t.is_section_label()))
    }

    /// Raw concatenated text of the line.
    pub fn text(&self, elements: &[Element]) -> String {
        self.elements(elements)
            .filter(|e| e.is_text())
            .map(|e| e.text_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group the given elements by `line_id`, ordered by (page, line number).
/// Elements without line metadata are ignored.
pub(crate) fn group_lines<I>(elements: &[Element], indices: I) -> Vec<Line>
where
    I: IntoIterator<Item = usize>,
{
    let mut lines: Vec<Line> = Vec::new();
    let mut by_id: HashMap<&str, usize> = HashMap::new();

    for i in indices {
        let elem = &elements[i];
        let Some(line_id) = elem.line_id.as_deref() else {
            continue;
        };
        let line_num = elem.line_num.unwrap_or(0);
        match by_id.get(line_id) {
            Some(&slot) => {
                let line = &mut lines[slot];
                line.members.push(i);
                line.page = line.page.min(elem.page);
                line.line_num = line.line_num.min(line_num);
            }
            None => {
                by_id.insert(line_id, lines.len());
                lines.push(Line {
                    id: line_id.to_string(),
                    page: elem.page,
                    line_num,
                    members: vec![i],
                });
            }
        }
    }

    for line in &mut lines {
        line.members.sort_by(|&a, &b| {
            elements[a]
                .position
                .x
                .total_cmp(&elements[b].position.x)
                .then(elements[a].id.cmp(&elements[b].id))
        });
    }
    lines.sort_by_key(|l| (l.page, l.line_num));
    lines
}
