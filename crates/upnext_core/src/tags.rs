use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[A-Za-z0-9_]+").expect("tag pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub text: String,
    pub tags: Vec<String>,
}

/// Splits raw task input into its description and `#tag` labels.
///
/// Tags keep their input order and are not deduplicated. Only the outer
/// whitespace of the remaining text is trimmed.
pub fn parse_input(raw: &str) -> ParsedInput {
    let tags = TAG_PATTERN
        .find_iter(raw)
        .map(|found| found.as_str()[1..].to_string())
        .collect();
    let text = TAG_PATTERN.replace_all(raw, "").trim().to_string();

    ParsedInput { text, tags }
}
