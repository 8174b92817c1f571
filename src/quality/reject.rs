use std::fmt::{Display, Formatter};

use crate::quality::language::is_cjk_ideograph;

const MAX_REPEAT_RUN: usize = 6;
const MIN_DENSE_RATIO: f64 = 0.30;
const PUNCTUATION_MIN_LEN: usize = 100;
const MIN_CHINESE_RATIO: f64 = 0.70;

/// Sentence punctuation, full-width and half-width. The curly quotes sit
/// next to their ASCII forms so either quoting style counts.
const PUNCTUATION: &[char] = &[
    '，', '。', '！', '？', '；', '：', '"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}',
    '（', '）', '【', '】', '《', '》', '、', '·', '…', '—', '～', '.', ',', '!', '?', ';', ':',
];

/// Cut-offs for the low-quality rules and the Chinese-ratio gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityThresholds {
    /// A run of this many identical characters rejects the text.
    pub max_repeat_run: usize,
    /// Minimum share of word/CJK characters among non-whitespace characters.
    pub min_dense_ratio: f64,
    /// Text longer than this (in chars) must carry some punctuation.
    pub punctuation_min_len: usize,
    pub min_chinese_ratio: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            max_repeat_run: MAX_REPEAT_RUN,
            min_dense_ratio: MIN_DENSE_RATIO,
            punctuation_min_len: PUNCTUATION_MIN_LEN,
            min_chinese_ratio: MIN_CHINESE_RATIO,
        }
    }
}

/// Which low-quality rule fired, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LowQualityReason {
    Empty,
    RepeatedRun { ch: char, len: usize },
    LowDensity { ratio: f64 },
    MissingPunctuation { len: usize },
}

impl Display for LowQualityReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LowQualityReason::Empty => write!(f, "empty text"),
            LowQualityReason::RepeatedRun { ch, len } => {
                write!(f, "character {:?} repeated {} times", ch, len)
            }
            LowQualityReason::LowDensity { ratio } => {
                write!(f, "word/CJK density {:.2} too low", ratio)
            }
            LowQualityReason::MissingPunctuation { len } => {
                write!(f, "{} characters without punctuation", len)
            }
        }
    }
}

/// Run the low-quality rules in order, stopping at the first hit.
pub fn find_low_quality(text: &str, thresholds: &QualityThresholds) -> Option<LowQualityReason> {
    // 1. Nothing but whitespace
    if text.chars().all(char::is_whitespace) {
        return Some(LowQualityReason::Empty);
    }

    // 2. Degenerate repetition
    if let Some((ch, len)) = find_repeated_run(text, thresholds.max_repeat_run) {
        return Some(LowQualityReason::RepeatedRun { ch, len });
    }

    // 3. Mostly symbols
    let (dense, non_space) = dense_counts(text);
    if non_space == 0 {
        return Some(LowQualityReason::Empty);
    }
    let ratio = dense as f64 / non_space as f64;
    if ratio < thresholds.min_dense_ratio {
        return Some(LowQualityReason::LowDensity { ratio });
    }

    // 4. Long text with no sentence structure
    let len = text.chars().count();
    if len > thresholds.punctuation_min_len && !text.chars().any(is_punctuation) {
        return Some(LowQualityReason::MissingPunctuation { len });
    }

    None
}

/// First run of at least `limit` identical characters, with its full length.
pub fn find_repeated_run(text: &str, limit: usize) -> Option<(char, usize)> {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let mut len = 1;
        while chars.next_if_eq(&c).is_some() {
            len += 1;
        }
        if len >= limit {
            return Some((c, len));
        }
    }
    None
}

pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

fn is_dense_char(c: char) -> bool {
    is_cjk_ideograph(c) || c.is_alphanumeric() || c == '_'
}

/// (word-or-CJK count, non-whitespace count)
fn dense_counts(text: &str) -> (usize, usize) {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .fold((0, 0), |(dense, total), c| {
            (dense + usize::from(is_dense_char(c)), total + 1)
        })
}
