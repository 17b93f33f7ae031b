use std::collections::BTreeMap;

use abstractor_core::{Column, Element};

use crate::config::LayoutConfig;

/// Group the elements of one column into visual lines.
///
/// Members are visited in (y, x, id) order. An element joins the earliest
/// open line whose first member lies within `tolerance` above it; since the
/// line anchors are non-decreasing the candidate is found by binary search.
/// Elements without geometry always get a line of their own.
fn group_into_lines(elements: &[Element], mut members: Vec<usize>, tolerance: f64) -> Vec<Vec<usize>> {
    members.sort_by(|&a, &b| {
        let (pa, pb) = (&elements[a].position, &elements[b].position);
        pa.y.total_cmp(&pb.y)
            .then(pa.x.total_cmp(&pb.x))
            .then(elements[a].id.cmp(&elements[b].id))
    });

    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut anchors: Vec<f64> = Vec::new();
    let mut open: Vec<bool> = Vec::new();

    for idx in members {
        let pos = &elements[idx].position;
        if pos.is_degenerate() {
            lines.push(vec![idx]);
            anchors.push(pos.y);
            open.push(false);
            continue;
        }
        let start = anchors.partition_point(|&a| a < pos.y - tolerance);
        let target = (start..lines.len()).find(|&l| open[l] && (pos.y - anchors[l]).abs() <= tolerance);
        match target {
            Some(l) => lines[l].push(idx),
            None => {
                lines.push(vec![idx]);
                anchors.push(pos.y);
                open.push(true);
            }
        }
    }

    for line in &mut lines {
        line.sort_by(|&a, &b| {
            elements[a]
                .position
                .x
                .total_cmp(&elements[b].position.x)
                .then(elements[a].id.cmp(&elements[b].id))
        });
    }
    lines
}

/// Assign columns and line metadata, and return the elements in reading
/// order: per page, the left column top to bottom, then the right column.
///
/// Returns the reordered elements and the number of lines built.
pub(crate) fn assign_reading_order(elements: Vec<Element>, config: &LayoutConfig) -> (Vec<Element>, usize) {
    let mut by_page: BTreeMap<u32, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for (i, elem) in elements.iter().enumerate() {
        let (left, right) = by_page.entry(elem.page).or_default();
        if elem.position.x < config.column_threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }

    let mut order: Vec<(usize, Column, u32, bool)> = Vec::with_capacity(elements.len());
    let mut line_count = 0usize;
    for (left, right) in by_page.into_values() {
        let mut line_num = 0u32;
        for (column, members) in [(Column::Left, left), (Column::Right, right)] {
            for line in group_into_lines(&elements, members, config.line_y_tolerance) {
                for (pos, idx) in line.into_iter().enumerate() {
                    order.push((idx, column, line_num, pos == 0));
                }
                line_num += 1;
                line_count += 1;
            }
        }
    }

    let mut slots: Vec<Option<Element>> = elements.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());
    for (idx, column, line_num, line_start) in order {
        if let Some(mut elem) = slots[idx].take() {
            elem.column = Some(column);
            elem.line_num = Some(line_num);
            elem.line_id = Some(format!("p{}_L{}", elem.page, line_num));
            elem.line_start = line_start;
            ordered.push(elem);
        }
    }
    (ordered, line_count)
}
