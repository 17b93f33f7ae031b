use once_cell::sync::Lazy;
use regex::Regex;

use abstractor_core::Author;

use crate::text_processing::clean_text;

static COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());
/// Name followed by its affiliation number, e.g. `A. Smith 1` or `B. Doe2`.
static INDEXED_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s*(\d+)$").unwrap());

/// Parse byline text into authors.
///
/// Each line is split on commas. A trailing number is the affiliation
/// index; a token that is only a number adds an index to the previous author
/// (`A. Smith1,2`). Duplicate (name, indices) pairs are dropped.
///
/// `"A. Smith1, B. Doe2;"` → `[A. Smith [1], B. Doe [2]]`
pub fn parse_authors<'a, I>(lines: I) -> Vec<Author>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut authors: Vec<Author> = Vec::new();
    for line in lines {
        for token in COMMA_RE.split(line) {
            let token = token.trim_end_matches(|c: char| c == ';' || c == ',' || c.is_whitespace());
            let token = token.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
            if token.is_empty() {
                continue;
            }

            if token.bytes().all(|b| b.is_ascii_digit()) {
                match (authors.last_mut(), token.parse::<u32>()) {
                    (Some(prev), Ok(index)) => prev.indices.push(index),
                    _ => tracing::debug!(token, "affiliation index without an author"),
                }
                continue;
            }

            let author = match INDEXED_NAME_RE.captures(token) {
                Some(caps) if !caps[1].trim().is_empty() => Author {
                    name: clean_text(caps[1].trim()),
                    indices: caps[2].parse::<u32>().into_iter().collect(),
                },
                _ => Author {
                    name: clean_text(token),
                    indices: Vec::new(),
                },
            };
            authors.push(author);
        }
    }

    for author in &mut authors {
        author.indices.sort_unstable();
        author.indices.dedup();
    }
    let mut unique: Vec<Author> = Vec::with_capacity(authors.len());
    for author in authors {
        if !unique.contains(&author) {
            unique.push(author);
        }
    }
    unique
}
