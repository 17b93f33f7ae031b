use std::collections::BTreeMap;
use std::io::Write;

use abstractor_core::{AbstractsDocument, SignatureStats};
use abstractor_layout::{NormalizeStats, by_frequency};
use abstractor_parsing::{ContextualReport, DeterministicStats};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn heading(w: &mut dyn Write, text: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", text.bold())
    } else {
        writeln!(w, "{}", text)
    }
}

pub fn print_normalize_summary(
    w: &mut dyn Write,
    stats: &NormalizeStats,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, "Normalized", color)?;
    writeln!(
        w,
        "  {} tokens -> {} elements ({} text, {} images, {} tables) on {} pages",
        stats.tokens,
        stats.elements(),
        stats.texts,
        stats.images,
        stats.tables,
        stats.pages
    )?;
    writeln!(
        w,
        "  {} runs merged, {} lines, {} superscripts and {} subscripts reattached",
        stats.merged_runs, stats.lines, stats.scripts.superscripts, stats.scripts.subscripts
    )?;
    if stats.scripts.unattached > 0 {
        let msg = format!("  ({} script candidates left unattached)", stats.scripts.unattached);
        if color.enabled() {
            writeln!(w, "{}", msg.dimmed())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }
    Ok(())
}

pub fn print_deterministic_summary(
    w: &mut dyn Write,
    stats: &DeterministicStats,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, "Pass 1", color)?;
    writeln!(
        w,
        "  {} of {} elements typed ({} already typed, {} unresolved)",
        stats.typed, stats.total, stats.already_typed, stats.unresolved
    )
}

pub fn print_clean_summary(
    w: &mut dyn Write,
    removed: usize,
    kept: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, "Clean", color)?;
    writeln!(w, "  removed {} headers/footers, kept {} elements", removed, kept)
}

pub fn print_contextual_summary(
    w: &mut dyn Write,
    report: &ContextualReport,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, "Pass 2", color)?;
    writeln!(
        w,
        "  {} abstracts, {} elements typed",
        report.abstracts, report.typed
    )?;
    for warning in &report.warnings {
        let detail = format!("{} ({}): {}", warning.abstract_id, warning.code, warning.issue);
        if color.enabled() {
            writeln!(w, "  {} {}", "WARNING:".yellow(), detail)?;
        } else {
            writeln!(w, "  WARNING: {}", detail)?;
        }
    }
    Ok(())
}

pub fn print_aggregate_summary(
    w: &mut dyn Write,
    doc: &AbstractsDocument,
    color: ColorMode,
) -> std::io::Result<()> {
    heading(w, "Pass 3", color)?;
    let active: Vec<_> = doc.active().collect();
    let untitled = active.iter().filter(|a| a.title.is_empty()).count();
    let without_authors = active.iter().filter(|a| a.authors.is_empty()).count();
    let without_sections = active.iter().filter(|a| a.sections.is_empty()).count();

    let total = format!("{} abstracts", doc.abstracts.len());
    if color.enabled() {
        write!(w, "  {}", total.green())?;
    } else {
        write!(w, "  {}", total)?;
    }
    writeln!(w, " ({} withdrawn)", doc.withdrawn_count())?;

    if untitled + without_authors + without_sections > 0 {
        let msg = format!(
            "  missing: {} titles, {} author lists, {} section sets",
            untitled, without_authors, without_sections
        );
        if color.enabled() {
            writeln!(w, "{}", msg.yellow())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }
    Ok(())
}

/// Frequency table of the signature catalog.
pub fn print_signatures(
    w: &mut dyn Write,
    catalog: &BTreeMap<String, SignatureStats>,
    limit: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let total: usize = catalog.values().map(|s| s.count).sum();
    heading(
        w,
        &format!("{} signatures over {} text spans", catalog.len(), total),
        color,
    )?;
    for (key, stats) in by_frequency(catalog).into_iter().take(limit) {
        let examples = stats.examples.join(" | ");
        if color.enabled() {
            writeln!(w, "{:>6}  {}  {}", stats.count, key.cyan(), examples.dimmed())?;
        } else {
            writeln!(w, "{:>6}  {}  {}", stats.count, key, examples)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstractor_core::AbstractRecord;

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_aggregate_summary_plain() {
        let doc = AbstractsDocument {
            abstracts: vec![
                AbstractRecord {
                    id: "abs_0001".to_string(),
                    title: "A trial".to_string(),
                    ..Default::default()
                },
                AbstractRecord {
                    id: "abs_0002".to_string(),
                    title: "WITHDRAWN".to_string(),
                    ..Default::default()
                },
            ],
        };
        let text = render(|w| print_aggregate_summary(w, &doc, ColorMode(false)));
        assert!(text.contains("2 abstracts (1 withdrawn)"));
        assert!(text.contains("0 titles, 1 author lists, 1 section sets"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_signatures_respects_limit() {
        let mut catalog = BTreeMap::new();
        for (key, count) in [("A_8.5_4", 3), ("B_8.5_4", 9), ("C_8.5_4", 1)] {
            catalog.insert(
                key.to_string(),
                SignatureStats {
                    font: key[..1].to_string(),
                    size: 8.5,
                    flags: 4,
                    count,
                    examples: vec!["x".to_string()],
                },
            );
        }
        let text = render(|w| print_signatures(w, &catalog, 2, ColorMode(false)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "3 signatures over 13 text spans");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("B_8.5_4"));
        assert!(lines[2].contains("A_8.5_4"));
    }
}
