use abstractor_core::{Element, ElementKind, ElementType};

use crate::config::{ParsingConfig, StyleRole};
use crate::spans::AbstractSpan;

/// Tag images and tables of the span, then attach caption-style runs that sit
/// just below an image.
pub(super) fn tag_media(elements: &mut [Element], span: &AbstractSpan, config: &ParsingConfig) {
    let mut images = Vec::new();
    for i in span.indices() {
        match elements[i].kind {
            ElementKind::Image => {
                elements[i].classify_if_untagged(ElementType::Image);
                images.push(i);
            }
            ElementKind::Table => {
                elements[i].classify_if_untagged(ElementType::Table);
            }
            ElementKind::Text => {}
        }
    }

    let h = &config.heuristics;
    if !h.caption_attachment {
        return;
    }
    for image in images {
        let page = elements[image].page;
        let bbox = elements[image].position;
        let top = bbox.bottom() - h.caption_epsilon;
        let bottom = bbox.bottom() + h.caption_margin + h.caption_epsilon;
        let left = bbox.x - h.caption_x_margin;
        let right = bbox.right() + h.caption_x_margin;

        for elem in &mut elements[span.indices()] {
            if elem.page != page || !elem.is_untagged() || !config.profile.matches(StyleRole::Caption, elem) {
                continue;
            }
            let p = elem.position;
            if (top..=bottom).contains(&p.y) && (left..=right).contains(&p.x) {
                elem.classify(ElementType::ImageText);
            }
        }
    }
}
