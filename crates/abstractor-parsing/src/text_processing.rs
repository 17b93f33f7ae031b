use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Normalize a label for keyword comparison: NBSP to space, whitespace
/// collapsed, trimmed, one trailing colon dropped, lowercased.
///
/// `"Background  and\u{a0}aims :"` → `"background and aims"`
pub fn normalize_label(text: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    let collapsed = WS_RE.replace_all(text.trim(), " ");
    let without_colon = collapsed.strip_suffix(':').unwrap_or(&*collapsed);
    without_colon.trim_end().to_lowercase()
}

/// Lowercase with NBSP folded to a plain space, for prefix matching.
pub fn fold_for_prefix(text: &str) -> String {
    text.replace('\u{a0}', " ").trim_start().to_lowercase()
}

/// Output form of extracted text: NFC with ligatures expanded.
pub fn clean_text(text: &str) -> String {
    expand_ligatures(text).nfc().collect()
}

/// Join span texts with single spaces, skipping empty ones.
pub fn join_texts<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let parts: Vec<&str> = texts
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    clean_text(&parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Background and aims:"), "background and aims");
        assert_eq!(normalize_label("  Results :  "), "results");
        assert_eq!(normalize_label("Materials\u{a0}and  methods"), "materials and methods");
        assert_eq!(normalize_label("Conclusions::"), "conclusions:");
    }

    #[test]
    fn test_fold_for_prefix() {
        assert_eq!(
            fold_for_prefix("Supported\u{a0}by: Foundation"),
            "supported by: foundation"
        );
    }

    #[test]
    fn test_clean_text_composes_and_expands() {
        // "e" + combining acute accent
        assert_eq!(clean_text("Caf\u{65}\u{301} \u{FB01}ne"), "Café fine");
    }

    #[test]
    fn test_join_texts() {
        assert_eq!(join_texts([" Hypertension ", "", "is common."]), "Hypertension is common.");
        assert_eq!(join_texts(Vec::<&str>::new()), "");
    }
}
