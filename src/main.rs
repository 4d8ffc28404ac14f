use eventsieve::{
    codec::PassthroughCodec,
    config::{AppConfig, SourceConfig},
    pipeline::{create_pipeline_channel, event::EventRecord, executor::PipelineExecutor},
    sources::interval::{run_interval_source, StaticProducer},
    sources::stdin::run_stdin_source,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let use_ansi = atty::is(atty::Stream::Stdout);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("eventsieve={}", log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer().with_ansi(use_ansi), // Disable ANSI colors in non-terminal environments
        )
        .init();

    let config = AppConfig::from_env()?;

    let (pipeline_tx, pipeline_rx) = create_pipeline_channel(100);
    let (output_tx, mut output_rx) = create_pipeline_channel(100);

    let executor = PipelineExecutor::new(&config, Arc::new(PassthroughCodec))?;
    tokio::spawn(async move {
        executor.run(pipeline_rx, output_tx).await;
    });

    // Kept records go to stdout, one JSON object per line.
    let writer = tokio::spawn(async move {
        while let Some(record) = output_rx.recv().await {
            match serde_json::to_string(&record) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::error!("Failed to serialize record: {}", e),
            }
        }
    });

    match &config.source {
        SourceConfig::Stdin => {
            run_stdin_source(pipeline_tx).await?;
        }
        SourceConfig::Interval {
            interval_secs,
            fields,
        } => {
            let mut template = EventRecord::new();
            for (name, value) in fields {
                template.set(name.as_str(), value.as_str());
            }
            run_interval_source(
                Duration::from_secs(*interval_secs),
                Arc::new(StaticProducer::new(template)),
                pipeline_tx,
            )
            .await?;
        }
    }
    writer.await?;

    Ok(())
}
