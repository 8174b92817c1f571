pub mod charset;
pub mod dump;
pub mod errors;
pub mod jsonl;
pub mod memory;
pub mod sql;

pub use dump::{DumpOptions, DumpRowSource};
pub use errors::SourceError;
pub use jsonl::JsonlRowSource;
pub use memory::MemoryRowSource;
pub use sql::{SqlRowSource, TableSpec};

use async_trait::async_trait;

use crate::pipeline::Record;

/// Supplies records in ascending id order, one keyset page at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Up to `limit` records with `id > after_id`. An empty page means the
    /// source is exhausted; restarting from the last seen id resumes a run.
    async fn next_batch(&self, after_id: i64, limit: usize) -> Result<Vec<Record>, SourceError>;
}
