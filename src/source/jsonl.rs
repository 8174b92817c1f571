use std::path::Path;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::pipeline::Record;
use crate::source::{MemoryRowSource, RowSource, SourceError};

/// `{"id": .., "content": ..}` lines, e.g. a previous export being re-filtered.
#[derive(Debug)]
pub struct JsonlRowSource {
    rows: MemoryRowSource,
}

impl JsonlRowSource {
    #[instrument(skip_all)]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::io(path, e))?;

        let rows = parse_lines(&text)?;
        info!(path = %path.display(), records = rows.len(), "loaded jsonl");

        Ok(Self {
            rows: MemoryRowSource::new(rows),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl RowSource for JsonlRowSource {
    async fn next_batch(&self, after_id: i64, limit: usize) -> Result<Vec<Record>, SourceError> {
        Ok(self.rows.page(after_id, limit).to_vec())
    }
}

pub fn parse_lines(text: &str) -> Result<Vec<Record>, SourceError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<Record>(line).map_err(|source| SourceError::Json {
                line: index + 1,
                source,
            })
        })
        .collect()
}
