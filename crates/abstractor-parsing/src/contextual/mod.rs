//! Contextual pass: per-abstract classification of the spans the
//! deterministic pass could not decide from their signature alone.

use std::fmt;

use abstractor_core::{Element, sort_reading_order};

use crate::ParsingError;
use crate::config::ParsingConfig;
use crate::lines::group_lines;
use crate::spans::{AbstractSpan, compute_abstract_spans};

mod header;
mod institutions;
mod media;
mod sections;

/// Per-abstract gap that degrades a record without aborting the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanIssue {
    /// The code marker's column has no line after the marker; only the
    /// abstract id was assigned.
    UnresolvedSpan,
    /// A section label directly follows the code marker.
    NoHeaderZone,
    NoByline,
    NoSemicolon,
    NoSectionLabels,
}

impl fmt::Display for SpanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpanIssue::UnresolvedSpan => "no lines after the code marker in its column",
            SpanIssue::NoHeaderZone => "no title/author lines before the first section label",
            SpanIssue::NoByline => "no byline found",
            SpanIssue::NoSemicolon => "author list has no closing semicolon",
            SpanIssue::NoSectionLabels => "no section labels",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanWarning {
    pub abstract_id: String,
    pub code: String,
    pub issue: SpanIssue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextualReport {
    pub abstracts: usize,
    /// Elements tagged by this pass.
    pub typed: usize,
    pub warnings: Vec<SpanWarning>,
}

impl ContextualReport {
    /// Abstracts that received nothing beyond their id.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.warnings
            .iter()
            .filter(|w| w.issue == SpanIssue::UnresolvedSpan)
            .map(|w| w.abstract_id.as_str())
    }
}

/// Run the contextual pass over a whole document.
///
/// Elements are put in reading order first; the slice stays in that order.
/// Pipeline per abstract span:
/// 1. Tag every span element with the abstract id
/// 2. Restrict to the code marker's column and find the header zone
/// 3. Split title and byline, extend authors to the closing semicolon
/// 4. Detect callout labels
/// 5. Tag the institution block after the author list
/// 6. Tag section bodies
/// 7. Tag media and attach captions
pub fn classify_contextual(
    elements: &mut [Element],
    config: &ParsingConfig,
) -> Result<ContextualReport, ParsingError> {
    if elements.is_empty() {
        return Err(ParsingError::EmptyDocument);
    }
    sort_reading_order(elements);
    let untagged_before = elements.iter().filter(|e| e.is_untagged()).count();

    let spans = compute_abstract_spans(elements);
    if spans.is_empty() {
        tracing::warn!(elements = elements.len(), "no abstract code markers found");
    }

    let mut report = ContextualReport {
        abstracts: spans.len(),
        ..Default::default()
    };
    for span in &spans {
        let issues = classify_span(elements, span, config);
        if issues.is_empty() {
            continue;
        }
        let code = elements[span.code_index].text_str().trim().to_string();
        for issue in issues {
            tracing::warn!(abstract_id = %span.abstract_id, code = %code, %issue, "abstract degraded");
            report.warnings.push(SpanWarning {
                abstract_id: span.abstract_id.clone(),
                code: code.clone(),
                issue,
            });
        }
    }

    let untagged_after = elements.iter().filter(|e| e.is_untagged()).count();
    report.typed = untagged_before - untagged_after;
    tracing::info!(
        abstracts = report.abstracts,
        typed = report.typed,
        warnings = report.warnings.len(),
        "contextual pass"
    );
    Ok(report)
}

fn classify_span(elements: &mut [Element], span: &AbstractSpan, config: &ParsingConfig) -> Vec<SpanIssue> {
    // Step 1
    for i in span.indices() {
        elements[i].assign_abstract(&span.abstract_id);
    }

    // Step 2
    let column = elements[span.code_index].column;
    let after_code = (span.code_index + 1..=span.end).filter(|&i| elements[i].column == column);
    let column_lines = group_lines(elements, after_code);
    if column_lines.is_empty() {
        return vec![SpanIssue::UnresolvedSpan];
    }

    let mut issues = Vec::new();
    let header_len = column_lines
        .iter()
        .position(|l| l.has_section_label(elements))
        .unwrap_or(column_lines.len());

    // Step 3
    let mut semicolon_line = None;
    if header_len == 0 {
        issues.push(SpanIssue::NoHeaderZone);
    } else {
        let header = &column_lines[..header_len];
        let outcome = header::classify_header(elements, header, config);
        match (outcome.byline, outcome.semicolon) {
            (None, _) => issues.push(SpanIssue::NoByline),
            (Some(_), None) => issues.push(SpanIssue::NoSemicolon),
            (Some(_), Some(line)) => semicolon_line = Some(header[line].id.clone()),
        }
    }

    // Step 4
    if config.heuristics.callout_labels {
        sections::tag_callouts(elements, span, config);
    }

    // Step 5
    if let Some(line_id) = semicolon_line {
        institutions::tag_institutions(elements, span, &line_id, config);
    }

    // Step 6
    if !sections::tag_section_bodies(elements, span, config) {
        issues.push(SpanIssue::NoSectionLabels);
    }

    // Step 7
    media::tag_media(elements, span, config);

    issues
}
