//! Clan and player tag handling.
//!
//! Users type tags in all sorts of shapes (`2pp`, ` #2PO0 `); the API only
//! accepts the canonical upper-case form with a leading `#`.

/// Normalize a tag to the in-game format.
///
/// Trims, upper-cases, replaces the letter `O` with the digit `0`, removes
/// everything outside `A-Z0-9` and prefixes `#`. An empty input is returned
/// unchanged.
///
/// ```
/// use clandiff_client::tag::correct_tag;
///
/// assert_eq!(correct_tag(" 2pp "), "#2PP");
/// assert_eq!(correct_tag("#2PO0"), "#2P00");
/// ```
pub fn correct_tag(tag: &str) -> String {
    if tag.is_empty() {
        return String::new();
    }
    let cleaned: String = tag
        .to_uppercase()
        .chars()
        .map(|c| if c == 'O' { '0' } else { c })
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    format!("#{}", cleaned)
}

/// Percent-encode `#` so the tag can sit in a URL path segment
pub fn encode_for_path(tag: &str) -> String {
    tag.replace('#', "%23")
}
