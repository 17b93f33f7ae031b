/// Whether `text` is a plausible abstract code.
///
/// Two shapes are accepted:
/// - numeric: 1 to 5 ASCII digits with a value in 1..=99999 (`0042`)
/// - alphanumeric: at most one space, 2 to 8 letters/digits once spaces are
///   removed, with at least one letter and one digit (`P 123`, `OC12`)
pub fn looks_like_abstract_code(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    is_numeric_code(text) || is_alphanumeric_code(text)
}

fn is_numeric_code(text: &str) -> bool {
    if text.len() > 5 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(text.parse::<u32>(), Ok(n) if (1..=99_999).contains(&n))
}

fn is_alphanumeric_code(text: &str) -> bool {
    if text.matches(' ').count() > 1 {
        return false;
    }
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    let len = compact.chars().count();
    (2..=8).contains(&len)
        && compact.chars().all(char::is_alphanumeric)
        && compact.chars().any(char::is_alphabetic)
        && compact.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_codes() {
        assert!(looks_like_abstract_code("1"));
        assert!(looks_like_abstract_code("0042"));
        assert!(looks_like_abstract_code("99999"));
        assert!(looks_like_abstract_code(" 123 "));
        assert!(!looks_like_abstract_code("0"));
        assert!(!looks_like_abstract_code("00000"));
        assert!(!looks_like_abstract_code("123456"));
    }

    #[test]
    fn test_alphanumeric_codes() {
        assert!(looks_like_abstract_code("P123"));
        assert!(looks_like_abstract_code("OC 12"));
        assert!(looks_like_abstract_code("LB1"));
        assert!(!looks_like_abstract_code("P 1 2"));
        assert!(!looks_like_abstract_code("ABCDEFG12"));
        assert!(!looks_like_abstract_code("Results"));
        assert!(!looks_like_abstract_code("A."));
    }

    #[test]
    fn test_prose_is_not_a_code() {
        assert!(!looks_like_abstract_code(""));
        assert!(!looks_like_abstract_code("WITHDRAWN"));
        assert!(!looks_like_abstract_code("A. Smith"));
        assert!(!looks_like_abstract_code("²"));
    }
}
