//! Reattachment of superscript and subscript glyphs to their base line.
//!
//! Small glyphs (author indices, chemical formulas, units) are emitted by the
//! page decoder with their own baseline, a little above or below the text
//! they belong to. Line grouping would turn them into stray one-glyph lines,
//! so their y is snapped onto the nearest plausible base run first.

use std::collections::BTreeMap;

use abstractor_core::{Element, ScriptAdjustment, ScriptKind};

use crate::config::LayoutConfig;

/// Counters reported in the normalized document metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptStats {
    pub superscripts: usize,
    pub subscripts: usize,
    /// Candidates left where they were.
    pub unattached: usize,
}

fn is_unicode_subscript(c: char) -> bool {
    matches!(c as u32, 0x2080..=0x208E | 0x2090..=0x209C)
}

fn is_unicode_superscript(c: char) -> bool {
    matches!(c as u32, 0x2070 | 0x2071 | 0x00B9 | 0x00B2 | 0x00B3 | 0x2074..=0x207F)
}

/// Script hint carried by the glyphs themselves. Subscripts win when both
/// kinds are present.
fn unicode_hint(text: &str) -> Option<ScriptKind> {
    if text.chars().any(is_unicode_subscript) {
        Some(ScriptKind::Sub)
    } else if text.chars().any(is_unicode_superscript) {
        Some(ScriptKind::Super)
    } else {
        None
    }
}

/// `Some(hint)` if the element is a script candidate.
fn script_candidate(elem: &Element, config: &LayoutConfig) -> Option<Option<ScriptKind>> {
    if !elem.is_text() || elem.position.is_degenerate() {
        return None;
    }
    if let Some(hint) = unicode_hint(elem.text_str()) {
        return Some(Some(hint));
    }
    let size = elem.signature.as_ref().map(|s| s.size()).unwrap_or(0.0);
    if elem.position.h < config.script_height_floor || size < config.script_size_floor {
        return Some(None);
    }
    None
}

/// Find the base run for a glyph at (`x`, `y`) among `bases`, which must be
/// sorted by y. Returns the base index and the script kind.
fn find_base(
    elements: &[Element],
    bases: &[usize],
    x: f64,
    y: f64,
    hint: Option<ScriptKind>,
    config: &LayoutConfig,
) -> Option<(usize, ScriptKind)> {
    let reach = config
        .unicode_script_tolerance
        .max(config.superscript_window.1)
        .max(config.subscript_window.1);
    let start = bases.partition_point(|&i| elements[i].position.y < y - reach);

    let mut best: Option<(usize, ScriptKind, f64)> = None;
    for &i in &bases[start..] {
        let base = &elements[i].position;
        if base.y > y + reach {
            break;
        }
        if (base.x - x).abs() > config.script_max_dx {
            continue;
        }
        let y_diff = base.y - y;
        let hit = match hint {
            Some(kind) => {
                let d = y_diff.abs();
                (d < config.unicode_script_tolerance).then_some((kind, d))
            }
            None => {
                let (sup_min, sup_max) = config.superscript_window;
                let (sub_min, sub_max) = config.subscript_window;
                if (sup_min..=sup_max).contains(&y_diff) {
                    Some((ScriptKind::Super, y_diff))
                } else if (sub_min..=sub_max).contains(&-y_diff) {
                    Some((ScriptKind::Sub, -y_diff))
                } else {
                    None
                }
            }
        };
        if let Some((kind, d)) = hit {
            if best.is_none_or(|(_, _, best_d)| d < best_d) {
                best = Some((i, kind, d));
            }
        }
    }
    best.map(|(i, kind, _)| (i, kind))
}

/// Snap script glyphs onto their base line, recording the original y.
///
/// Base runs are the non-candidate text spans of the same page. They are
/// indexed by y once per page so each lookup is a binary search plus a short
/// scan. Ties go to the base that comes first in (y, input) order.
pub(crate) fn attach_scripts(elements: &mut [Element], config: &LayoutConfig) -> ScriptStats {
    let mut stats = ScriptStats::default();
    let mut bases_by_page: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut candidates: Vec<(usize, Option<ScriptKind>)> = Vec::new();

    for (i, elem) in elements.iter().enumerate() {
        if !elem.is_text() {
            continue;
        }
        match script_candidate(elem, config) {
            Some(hint) => candidates.push((i, hint)),
            None if !elem.position.is_degenerate() => {
                bases_by_page.entry(elem.page).or_default().push(i)
            }
            None => {}
        }
    }
    for bases in bases_by_page.values_mut() {
        bases.sort_by(|&a, &b| elements[a].position.y.total_cmp(&elements[b].position.y));
    }

    let mut moves: Vec<(usize, f64, ScriptKind)> = Vec::new();
    for (i, hint) in candidates {
        let glyph = &elements[i];
        let found = bases_by_page.get(&glyph.page).and_then(|bases| {
            find_base(elements, bases, glyph.position.x, glyph.position.y, hint, config)
        });
        match found {
            Some((base, kind)) => moves.push((i, elements[base].position.y, kind)),
            None => stats.unattached += 1,
        }
    }

    for (i, base_y, kind) in moves {
        let glyph = &mut elements[i];
        glyph.script_adjustment = Some(ScriptAdjustment {
            kind,
            original_y: glyph.position.y,
        });
        glyph.position.y = base_y;
        match kind {
            ScriptKind::Super => stats.superscripts += 1,
            ScriptKind::Sub => stats.subscripts += 1,
        }
    }

    tracing::debug!(
        superscripts = stats.superscripts,
        subscripts = stats.subscripts,
        unattached = stats.unattached,
        "script reattachment"
    );
    stats
}
