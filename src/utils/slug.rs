use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("whitespace pattern is valid")
});

/// Derives the stored `username` from a display name.
///
/// Lower-cases the name and collapses every whitespace run into a single `_`,
/// so "Ada  Lovelace" becomes "ada_lovelace".
pub fn slugify(display_name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&display_name.to_lowercase(), "_")
        .into_owned()
}
