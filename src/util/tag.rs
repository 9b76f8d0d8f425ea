//! Clash of Clans player and clan tag helpers.

const TAG_ALPHABET: &str = "0289PYLQGRJCUV";

/// Normalizes a user-entered tag to the API form.
///
/// Trims whitespace, upper-cases, replaces the letter `O` with zero and adds the
/// leading `#` when missing.
pub fn normalize_tag(tag: &str) -> String {
    let body: String = tag
        .trim()
        .trim_start_matches('#')
        .to_ascii_uppercase()
        .replace('O', "0");
    format!("#{}", body)
}

/// Checks that a normalized tag only uses characters the game issues.
pub fn is_valid_tag(tag: &str) -> bool {
    match tag.strip_prefix('#') {
        Some(body) => {
            (3..=12).contains(&body.len()) && body.chars().all(|c| TAG_ALPHABET.contains(c))
        }
        None => false,
    }
}
