use std::sync::LazyLock;

use regex::Regex;

static TEMPLATE_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\}\s*\{\{").unwrap());
static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());

/// Turns page markup into readable prose: link brackets are dropped, runs of
/// adjacent templates are merged and every template span is removed.
/// Whitespace around removed spans is left alone.
pub fn clean_markup(markup: &str) -> String {
    let unbracketed: String = markup.chars().filter(|c| !matches!(c, '[' | ']')).collect();
    let merged = TEMPLATE_BOUNDARY_RE.replace_all(&unbracketed, "");
    TEMPLATE_RE.replace_all(&merged, "").into_owned()
}
