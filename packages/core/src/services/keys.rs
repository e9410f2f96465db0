//! Render key normalization
//!
//! Property keys and root aliases are free-form labels ("First Name"). The
//! public render uses them as object keys in lowerCamelCase ("firstName").

/// Convert a space-separated label into a lowerCamelCase identifier
///
/// The first word is lowercased; every following word gets an uppercase
/// first letter and lowercase rest. Whitespace is dropped.
///
/// ```rust
/// # use contentree_core::services::normalize_key;
/// assert_eq!(normalize_key("First Name"), "firstName");
/// assert_eq!(normalize_key("My  FORM title"), "myFormTitle");
/// ```
pub fn normalize_key(label: &str) -> String {
    let mut words = label.split_whitespace();
    let mut out = match words.next() {
        Some(first) => first.to_lowercase(),
        None => return String::new(),
    };
    for word in words {
        out.push_str(&capitalize(word));
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
