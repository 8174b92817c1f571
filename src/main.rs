use anyhow::{Context, Result};
use corpus_sieve::{
    config::{Config, ExportMode, SourceConfig},
    export::Exporter,
    pipeline::ContentFilterPipeline,
    quality::QualityClassifier,
    sink::JsonlSink,
    source::{DumpOptions, DumpRowSource, JsonlRowSource, RowSource, SqlRowSource, TableSpec},
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!(
        "Exporting {} to {}",
        config.table(),
        config.output_path().display()
    );

    let source = open_source(&config).await?;
    let sink = JsonlSink::create(config.output_path(), config.append())
        .with_context(|| format!("opening {}", config.output_path().display()))?;

    let pipeline = match config.mode() {
        ExportMode::Filter => {
            ContentFilterPipeline::new(QualityClassifier::new(*config.thresholds()))
        }
        ExportMode::Clean => ContentFilterPipeline::clean_only(),
    };

    let mut exporter = Exporter::new(
        source,
        Box::new(sink),
        pipeline,
        config.export_options().clone(),
    )?;

    let shutdown_token = exporter.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received shutdown signal, stopping after the current batch...");
        shutdown_token.cancel();
    });

    let summary = exporter.run().await?;
    if summary.cancelled {
        info!(
            "Export interrupted; resume with SIEVE_RESUME_AFTER_ID={}",
            summary.last_id
        );
    }
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

async fn open_source(config: &Config) -> Result<Box<dyn RowSource>> {
    let source: Box<dyn RowSource> = match config.source() {
        SourceConfig::Sql { database_url } => {
            let spec = TableSpec {
                id_column: config.id_column().to_string(),
                content_column: config.content_column().to_string(),
                skip_empty: config.skip_empty(),
                ..TableSpec::new(config.table())
            };
            Box::new(SqlRowSource::connect(database_url, spec).await?)
        }
        SourceConfig::Dump {
            path,
            content_index,
        } => {
            let options = DumpOptions {
                content_index: *content_index,
                ..DumpOptions::new(config.table())
            };
            let source = DumpRowSource::open(path, &options)
                .await
                .with_context(|| format!("reading dump {}", path.display()))?;
            Box::new(source)
        }
        SourceConfig::Jsonl { path } => {
            let source = JsonlRowSource::open(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            Box::new(source)
        }
    };
    Ok(source)
}
