pub mod backoff;
pub mod errors;

pub use backoff::calculate_backoff_delay;
pub use errors::ExportError;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::pipeline::{ContentFilterPipeline, FilterCounts, ProcessOutput, Record};
use crate::sink::{RecordSink, SinkError};
use crate::source::RowSource;

/// Batch driver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub batch_size: usize,
    /// Records with `id <= resume_after_id` are skipped.
    pub resume_after_id: i64,
    /// More than one worker filters each batch on a rayon pool.
    pub workers: usize,
    /// Extra attempts for a page read that failed transiently.
    pub max_retries: u32,
    pub retry_base_ms: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            batch_size: 10_000,
            resume_after_id: 0,
            workers: 1,
            max_retries: 3,
            retry_base_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub batches: u64,
    /// Highest id consumed; pass it back as `resume_after_id` to continue.
    pub last_id: i64,
    pub counts: FilterCounts,
    pub cancelled: bool,
}

/// Wires a row source, the filter pipeline and a sink together.
pub struct Exporter {
    source: Box<dyn RowSource>,
    /// Only touched from blocking tasks.
    sink: Arc<Mutex<Box<dyn RecordSink>>>,
    pipeline: ContentFilterPipeline,
    options: ExportOptions,
    pool: Option<Arc<rayon::ThreadPool>>,
    shutdown_token: CancellationToken,
}

impl Exporter {
    pub fn new(
        source: Box<dyn RowSource>,
        sink: Box<dyn RecordSink>,
        pipeline: ContentFilterPipeline,
        options: ExportOptions,
    ) -> Result<Self, ExportError> {
        let pool = if options.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.workers)
                .thread_name(|i| format!("sieve-filter-{}", i))
                .build()?;
            Some(Arc::new(pool))
        } else {
            None
        };

        Ok(Self {
            source,
            sink: Arc::new(Mutex::new(sink)),
            pipeline,
            options,
            pool,
            shutdown_token: CancellationToken::new(),
        })
    }

    /// Cancelling this token stops the run at the next batch boundary.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    #[instrument(skip(self), fields(batch_size = self.options.batch_size))]
    pub async fn run(&mut self) -> Result<ExportSummary, ExportError> {
        let mut summary = ExportSummary {
            last_id: self.options.resume_after_id,
            ..ExportSummary::default()
        };
        info!(
            "Starting export after id {} (workers: {})",
            summary.last_id, self.options.workers
        );

        loop {
            let batch = tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => None,
                batch = self.fetch_with_retry(summary.last_id) => Some(batch?),
            };
            let Some(batch) = batch else {
                summary.cancelled = true;
                break;
            };
            if batch.is_empty() {
                break;
            }

            let fetched = batch.len();
            let batch_last_id = batch.iter().map(|r| r.id).max().unwrap_or(summary.last_id);

            let output = self.filter_and_write(batch).await?;

            summary.batches += 1;
            summary.last_id = batch_last_id;
            summary.counts += output.counts;
            info!(
                batch = summary.batches,
                last_id = summary.last_id,
                kept = summary.counts.kept,
                rejected_low_quality = summary.counts.rejected_low_quality,
                rejected_low_chinese_ratio = summary.counts.rejected_low_chinese_ratio,
                "batch exported"
            );

            if fetched < self.options.batch_size {
                break;
            }
            if self.shutdown_token.is_cancelled() {
                summary.cancelled = true;
                break;
            }
        }

        let sink = self.sink.clone();
        tokio::task::spawn_blocking(move || sink.blocking_lock().flush()).await??;
        info!(
            "Export finished: {} kept, {} low quality, {} low chinese ratio, last id {}",
            summary.counts.kept,
            summary.counts.rejected_low_quality,
            summary.counts.rejected_low_chinese_ratio,
            summary.last_id
        );
        Ok(summary)
    }

    async fn fetch_with_retry(&self, after_id: i64) -> Result<Vec<Record>, ExportError> {
        let mut attempt = 0;
        loop {
            match self
                .source
                .next_batch(after_id, self.options.batch_size)
                .await
            {
                Ok(batch) => return Ok(batch),
                Err(err) if err.should_retry() && attempt < self.options.max_retries => {
                    let delay = calculate_backoff_delay(attempt, self.options.retry_base_ms);
                    warn!(
                        "Reading after id {} failed (attempt {}/{}), retrying in {}ms: {}",
                        after_id,
                        attempt + 1,
                        self.options.max_retries + 1,
                        delay.as_millis(),
                        err
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(source) => return Err(ExportError::Source { after_id, source }),
            }
        }
    }

    /// Filter a batch and write its kept records, off the async runtime.
    async fn filter_and_write(&self, batch: Vec<Record>) -> Result<ProcessOutput, ExportError> {
        let pipeline = self.pipeline;
        let pool = self.pool.clone();
        let sink = self.sink.clone();
        debug!(records = batch.len(), "filtering batch");

        let output = tokio::task::spawn_blocking(move || -> Result<ProcessOutput, SinkError> {
            let output = match pool {
                Some(pool) => pool.install(|| pipeline.process_parallel(&batch)),
                None => pipeline.process(&batch),
            };

            let mut sink = sink.blocking_lock();
            for object in &output.kept {
                sink.write(object)?;
            }
            sink.flush()?;
            Ok(output)
        })
        .await??;
        Ok(output)
    }
}
