pub mod config;
pub mod export;
pub mod normalizer;
pub mod pipeline;
pub mod quality;
pub mod sink;
pub mod source;

pub use normalizer::{TextNormalizer, WhitespaceMode};
pub use pipeline::{ContentFilterPipeline, FilterCounts, OutputObject, Record};
pub use quality::{QualityClassifier, Verdict};
