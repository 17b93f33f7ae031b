use abstractor_core::{Element, ElementType};

use crate::config::{ParsingConfig, StyleRole};
use crate::lines::group_lines;
use crate::spans::AbstractSpan;

/// Tag the affiliation block that follows the author list.
///
/// Lines are scanned across both columns starting after the line that closed
/// the author list. A line opening with an indice marker joins the block;
/// with `unindexed_institution_lines` set, a plain body line does too. The
/// block ends at the first section label or the first line that fits neither.
pub(super) fn tag_institutions(
    elements: &mut [Element],
    span: &AbstractSpan,
    semicolon_line: &str,
    config: &ParsingConfig,
) -> usize {
    let profile = &config.profile;
    let lines = group_lines(elements, span.indices());
    let Some(start) = lines.iter().position(|l| l.id == semicolon_line) else {
        return 0;
    };

    let mut tagged = 0;
    let mut in_block = false;
    for line in &lines[start + 1..] {
        if line.has_section_label(elements) {
            break;
        }
        let texts: Vec<usize> = line.text_members(elements).collect();
        let Some(&first) = texts.first() else {
            if in_block {
                break;
            }
            continue;
        };

        let body: Vec<usize> = texts
            .iter()
            .copied()
            .filter(|&i| profile.matches(StyleRole::BodyText, &elements[i]))
            .collect();
        let indexed = elements[first].has_tag(ElementType::Indice);
        let plain = config.heuristics.unindexed_institution_lines
            && !body.is_empty()
            && texts.iter().all(|&i| elements[i].is_untagged() && body.contains(&i));
        if !(indexed || plain) {
            break;
        }

        // an indexed line takes every style, a plain line is body text only
        let members = if indexed { texts } else { body };
        for i in members {
            if elements[i].classify_if_untagged(ElementType::Institution) {
                tagged += 1;
            }
        }
        in_block = true;
    }
    tagged
}
