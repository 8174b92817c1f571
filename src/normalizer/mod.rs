pub mod cleaner;
pub mod model;
pub mod reader;

#[cfg(test)]
mod tests;

pub use model::{MarkupStrategy, WhitespaceMode, normalize_whitespace};

/// Upper bound on strip passes over nested entity encodings.
const MAX_PASSES: usize = 32;

/// Turns raw HTML/markup into plain text.
///
/// Stateless and `Copy`; share it freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextNormalizer {
    mode: WhitespaceMode,
    strategy: MarkupStrategy,
}

impl TextNormalizer {
    pub fn new(mode: WhitespaceMode) -> Self {
        Self {
            mode,
            strategy: MarkupStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: MarkupStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn mode(&self) -> WhitespaceMode {
        self.mode
    }

    pub fn strategy(&self) -> MarkupStrategy {
        self.strategy
    }

    /// Stripping can expose new markup (`&lt;b&gt;` decodes to `<b>`), so
    /// passes repeat until the text is stable.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let mut text = self.pass(raw);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&text);
            if next == text {
                break;
            }
            text = next;
        }
        text
    }

    fn pass(&self, raw: &str) -> String {
        // 1. Strip markup and decode entities
        let text = match self.strategy {
            MarkupStrategy::Parser => reader::extract_text(raw),
            MarkupStrategy::Regex => cleaner::strip_tags(raw),
        };

        // 2. Fold whitespace
        normalize_whitespace(&text, self.mode)
    }

    /// Null content normalizes to the empty string.
    pub fn normalize_opt(&self, raw: Option<&str>) -> String {
        raw.map(|raw| self.normalize(raw)).unwrap_or_default()
    }
}

pub fn normalize(raw: &str, mode: WhitespaceMode) -> String {
    TextNormalizer::new(mode).normalize(raw)
}

pub fn normalize_batch<I, S>(docs: I, mode: WhitespaceMode) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalizer = TextNormalizer::new(mode);
    docs.into_iter()
        .map(|doc| normalizer.normalize(doc.as_ref()))
        .collect()
}
