use sqlx::AnyPool;

use corpus_sieve::{
    export::{ExportOptions, Exporter},
    pipeline::ContentFilterPipeline,
    sink::JsonlSink,
    source::{RowSource, SqlRowSource, TableSpec},
};

/// Each test gets its own table since tests run concurrently.
async fn setup_test_db(table: &str) -> Option<AnyPool> {
    // Skip tests if TEST_DATABASE_URL is not set
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping database tests: TEST_DATABASE_URL not set");
            return None;
        }
    };

    sqlx::any::install_default_drivers();
    let pool = AnyPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(&pool)
        .await
        .expect("Failed to drop test table");
    sqlx::query(&format!(
        "CREATE TABLE {} (id BIGINT PRIMARY KEY, content TEXT)",
        table
    ))
    .execute(&pool)
    .await
    .expect("Failed to create test table");

    let rows = [
        "(1, '<p>你好，世界！这是一个完整的句子。</p>')",
        "(2, '<p>哈哈哈哈哈哈哈哈哈哈</p>')",
        "(3, NULL)",
        "(4, '')",
        "(5, '<div>plain english text.</div>')",
    ];
    sqlx::query(&format!("INSERT INTO {} (id, content) VALUES {}", table, rows.join(", ")))
        .execute(&pool)
        .await
        .expect("Failed to insert test rows");

    Some(pool)
}

#[tokio::test]
async fn test_sql_keyset_pages() {
    let table = "sieve_test_pages";
    let Some(pool) = setup_test_db(table).await else {
        return;
    };
    let source = SqlRowSource::new(pool, TableSpec::new(table)).unwrap();

    let first = source.next_batch(0, 2).await.unwrap();
    assert_eq!(first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

    let second = source.next_batch(2, 2).await.unwrap();
    assert_eq!(second.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(second[0].raw_content, None);
    assert_eq!(second[1].raw_content.as_deref(), Some(""));

    assert!(source.next_batch(5, 2).await.unwrap().is_empty());
    source.close().await;
}

#[tokio::test]
async fn test_sql_skip_empty() {
    let table = "sieve_test_skip_empty";
    let Some(pool) = setup_test_db(table).await else {
        return;
    };
    let spec = TableSpec {
        skip_empty: true,
        ..TableSpec::new(table)
    };
    let source = SqlRowSource::new(pool, spec).unwrap();

    let ids: Vec<i64> = source
        .next_batch(0, 100)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 5]);
}

#[tokio::test]
async fn test_sql_export() {
    let table = "sieve_test_export";
    let Some(pool) = setup_test_db(table).await else {
        return;
    };
    let source = SqlRowSource::new(pool, TableSpec::new(table)).unwrap();
    let mut exporter = Exporter::new(
        Box::new(source),
        Box::new(JsonlSink::new(Vec::new())),
        ContentFilterPipeline::default(),
        ExportOptions {
            batch_size: 2,
            ..ExportOptions::default()
        },
    )
    .unwrap();

    let summary = exporter.run().await.unwrap();
    assert_eq!(summary.last_id, 5);
    assert_eq!(summary.counts.kept, 1);
    assert_eq!(summary.counts.rejected_low_quality, 3);
    assert_eq!(summary.counts.rejected_low_chinese_ratio, 1);
}
