use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[A-Za-z0-9]+").expect("valid regex");
}

/// Strip HTML markup from `html`, keeping only text outside of tags.
///
/// `<` enters tag state and `>` leaves it; everything in between, delimiters
/// included, is discarded. A `>` outside any tag is discarded as well, and an
/// unclosed `<` drops the remainder of the input. There is no handling of
/// `<` or `>` inside attribute values or comments; this is a known
/// limitation of the character-level scan, kept as documented behavior.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut inside_tag = false;
    for c in html.chars() {
        match c {
            '<' => inside_tag = true,
            '>' => inside_tag = false,
            _ if !inside_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Extract normalized word tokens: maximal runs of ASCII alphanumerics,
/// lowercased. Order-preserving, duplicates retained; frequency counting
/// happens downstream. Always succeeds, yielding an empty vec for input
/// with no alphanumeric characters.
pub fn extract_tokens(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}
