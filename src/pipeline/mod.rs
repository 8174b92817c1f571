pub mod types;

pub use types::{FilterCounts, OutputObject, ProcessOutput, Record};

use rayon::prelude::*;
use tracing::debug;

use crate::normalizer::{TextNormalizer, WhitespaceMode};
use crate::quality::{QualityClassifier, Verdict};

/// normalize → classify → emit or drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentFilterPipeline {
    normalizer: TextNormalizer,
    classifier: QualityClassifier,
    filter: bool,
}

impl Default for ContentFilterPipeline {
    fn default() -> Self {
        Self::new(QualityClassifier::default())
    }
}

impl ContentFilterPipeline {
    /// Compact normalization followed by classification.
    pub fn new(classifier: QualityClassifier) -> Self {
        Self {
            normalizer: TextNormalizer::new(WhitespaceMode::Compact),
            classifier,
            filter: true,
        }
    }

    /// Spaced normalization and no classification: every record is emitted.
    pub fn clean_only() -> Self {
        Self {
            normalizer: TextNormalizer::new(WhitespaceMode::Spaced),
            classifier: QualityClassifier::default(),
            filter: false,
        }
    }

    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &QualityClassifier {
        &self.classifier
    }

    /// Run a single record. The object is present only for `Keep`.
    pub fn evaluate(&self, record: &Record) -> (Verdict, Option<OutputObject>) {
        let content = self.normalizer.normalize_opt(record.raw_content.as_deref());

        let verdict = if self.filter {
            self.classifier.classify(&content)
        } else {
            Verdict::Keep
        };

        if !verdict.is_keep() {
            debug!(id = record.id, ?verdict, "record dropped");
            return (verdict, None);
        }

        let object = OutputObject {
            id: record.id,
            content,
        };
        (verdict, Some(object))
    }

    pub fn process(&self, batch: &[Record]) -> ProcessOutput {
        batch
            .iter()
            .fold(ProcessOutput::default(), |acc, record| self.push(acc, record))
    }

    /// Same result as [`process`](Self::process), spread over the current
    /// rayon pool. Input order is preserved.
    pub fn process_parallel(&self, batch: &[Record]) -> ProcessOutput {
        batch
            .par_iter()
            .fold(ProcessOutput::default, |acc, record| self.push(acc, record))
            .reduce(ProcessOutput::default, ProcessOutput::merge)
    }

    fn push(&self, mut acc: ProcessOutput, record: &Record) -> ProcessOutput {
        let (verdict, object) = self.evaluate(record);
        acc.counts.record(verdict);
        if let Some(object) = object {
            acc.kept.push(object);
        }
        acc
    }
}
