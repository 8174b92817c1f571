/// How runs of whitespace are folded once markup has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespaceMode {
    /// Every run becomes a single ASCII space, ends trimmed.
    #[default]
    Spaced,
    /// Whitespace is removed entirely. Used ahead of quality scoring.
    Compact,
}

/// Which tag stripper turns markup into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkupStrategy {
    /// HTML5 parser, falling back to the regex stripper on unusable parses.
    #[default]
    Parser,
    /// Regex stripper only.
    Regex,
}

pub fn normalize_whitespace(text: &str, mode: WhitespaceMode) -> String {
    // char::is_whitespace covers \n \r \t, U+00A0 and U+3000
    match mode {
        WhitespaceMode::Spaced => text.split_whitespace().collect::<Vec<_>>().join(" "),
        WhitespaceMode::Compact => text.chars().filter(|c| !c.is_whitespace()).collect(),
    }
}
