use super::lexer::is_identifier_char;
use std::collections::BTreeSet;

/// Returns every `{identifier}` placeholder referenced by the formula source.
///
/// This is a lexical scan only. Braces whose content is not a valid
/// identifier are skipped, so malformed formulas still report the names they
/// clearly reference.
pub fn extract_names(source: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = source;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find(|c: char| !is_identifier_char(c)) {
            Some(end) if end > 0 && after[end..].starts_with('}') => {
                names.insert(after[..end].to_string());
                rest = &after[end + 1..];
            }
            _ => rest = after,
        }
    }
    names
}
