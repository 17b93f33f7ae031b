use abstractor_core::{Element, Position};

use crate::config::LayoutConfig;

/// Decide whether `next` continues the span ending with `prev`.
fn continues_span(prev: &Element, next: &Element, config: &LayoutConfig) -> bool {
    if prev.page != next.page || prev.signature.is_none() || prev.signature != next.signature {
        return false;
    }
    if prev.position.is_degenerate() || next.position.is_degenerate() {
        return false;
    }
    let dy = (next.position.y - prev.position.y).abs();
    let gap = next.position.x - prev.position.right();
    dy <= config.merge_y_tolerance && gap <= config.merge_gap_tolerance
}

/// Fold a run of tokens into one span: space-joined text, union box anchored
/// at the first token, id of the first token.
fn combine(group: Vec<Element>) -> Option<Element> {
    let count = group.len();
    let mut iter = group.into_iter();
    let mut first = iter.next()?;
    if count == 1 {
        return Some(first);
    }

    let mut text = first.text.take().unwrap_or_default();
    let x0 = first.position.x;
    let y0 = first.position.y;
    let mut right = first.position.right();
    let mut bottom = first.position.bottom();
    for e in iter {
        text.push(' ');
        text.push_str(e.text_str());
        right = e.position.right();
        bottom = bottom.max(e.position.bottom());
    }

    first.text = Some(text);
    first.position = Position::new(x0, y0, right - x0, bottom - y0);
    first.merged_count = Some(count);
    Some(first)
}

/// Merge consecutive text runs (in input order) that share a signature and
/// sit on the same visual line.
pub(crate) fn merge_spans(texts: Vec<Element>, config: &LayoutConfig) -> Vec<Element> {
    let mut merged = Vec::with_capacity(texts.len());
    let mut group: Vec<Element> = Vec::new();

    for elem in texts {
        let continues = group
            .last()
            .is_some_and(|prev| continues_span(prev, &elem, config));
        if !continues && !group.is_empty() {
            merged.extend(combine(std::mem::take(&mut group)));
        }
        group.push(elem);
    }
    merged.extend(combine(group));
    merged
}
