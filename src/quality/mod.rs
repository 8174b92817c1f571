pub mod language;
pub mod reject;

pub use language::chinese_ratio;
pub use reject::{LowQualityReason, QualityThresholds};

/// Outcome of classifying one normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Keep,
    RejectLowQuality,
    RejectLowChineseRatio,
}

impl Verdict {
    pub fn is_keep(self) -> bool {
        matches!(self, Verdict::Keep)
    }
}

/// Keep/drop heuristics for corpus text. Total over all strings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityClassifier {
    thresholds: QualityThresholds,
}

impl QualityClassifier {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    pub fn classify(&self, text: &str) -> Verdict {
        if self.looks_low_quality(text) {
            return Verdict::RejectLowQuality;
        }
        if chinese_ratio(text) < self.thresholds.min_chinese_ratio {
            return Verdict::RejectLowChineseRatio;
        }
        Verdict::Keep
    }

    /// The first low-quality rule `text` trips, if any.
    pub fn explain(&self, text: &str) -> Option<LowQualityReason> {
        reject::find_low_quality(text, &self.thresholds)
    }

    pub fn looks_low_quality(&self, text: &str) -> bool {
        self.explain(text).is_some()
    }
}

/// Classify with the default thresholds.
pub fn classify(text: &str) -> Verdict {
    QualityClassifier::default().classify(text)
}

pub fn looks_low_quality(text: &str) -> bool {
    QualityClassifier::default().looks_low_quality(text)
}
