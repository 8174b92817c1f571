use async_trait::async_trait;

use crate::pipeline::Record;
use crate::source::{RowSource, SourceError};

/// Records held in memory, served in keyset pages.
///
/// File-backed sources load into this so they follow the same
/// restart-after-id contract as the database source.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    rows: Vec<Record>,
}

impl MemoryRowSource {
    pub fn new(mut rows: Vec<Record>) -> Self {
        rows.sort_by_key(|record| record.id);
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn page(&self, after_id: i64, limit: usize) -> &[Record] {
        let start = self.rows.partition_point(|record| record.id <= after_id);
        let end = start.saturating_add(limit).min(self.rows.len());
        &self.rows[start..end]
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn next_batch(&self, after_id: i64, limit: usize) -> Result<Vec<Record>, SourceError> {
        Ok(self.page(after_id, limit).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MemoryRowSource {
        MemoryRowSource::new(
            [5, 1, 3, 9, 7]
                .into_iter()
                .map(|id| Record::new(id, Some(format!("row {}", id))))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_pages_in_id_order() {
        let source = source();
        let first = source.next_batch(0, 2).await.unwrap();
        assert_eq!(first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

        let second = source.next_batch(3, 2).await.unwrap();
        assert_eq!(second.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 7]);

        let third = source.next_batch(7, 2).await.unwrap();
        assert_eq!(third.iter().map(|r| r.id).collect::<Vec<_>>(), vec![9]);

        assert!(source.next_batch(9, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restart_from_checkpoint_between_ids() {
        let batch = source().next_batch(4, 10).await.unwrap();
        assert_eq!(batch.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 7, 9]);
    }
}
