//! Block identifier sanitisation.

const INVISIBLE_CHARS: [char; 6] = [
    '\u{feff}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}', '\u{180e}',
];

/// Turn an arbitrary block identifier into a safe, lowercase directory name.
///
/// Invisible characters are dropped, every non-word character becomes `_`, and a
/// leading digit is prefixed with `letter_` so the name is also a valid identifier.
pub fn clean_name(name: &str) -> String {
    clean_name_allowing(name, &[])
}

/// Like [`clean_name`] but keeps the characters in `allowed` verbatim.
pub fn clean_name_allowing(name: &str, allowed: &[char]) -> String {
    let mut cleaned: String = name
        .chars()
        .filter(|c| !INVISIBLE_CHARS.contains(c))
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || allowed.contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        cleaned = format!("letter_{}", cleaned);
    }

    cleaned.to_lowercase()
}
