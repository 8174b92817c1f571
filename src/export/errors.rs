use thiserror::Error;

use crate::sink::SinkError;
use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum ExportError {
    /// `after_id` is the checkpoint to resume from.
    #[error("source error after id {after_id}: {source}")]
    Source {
        after_id: i64,
        #[source]
        source: SourceError,
    },

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("filter task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
