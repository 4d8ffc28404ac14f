use crate::error::Result;
use crate::pipeline::{event::EventRecord, PipelineSender};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Produces a batch of records on each scheduled tick.
///
/// Query clients for external systems implement this; the built-in
/// [`StaticProducer`] replays a fixed set of fields.
#[async_trait::async_trait]
pub trait Producer: Send + Sync {
    async fn produce(&self) -> Result<Vec<EventRecord>>;
}

/// Emits one copy of a fixed record template per tick.
pub struct StaticProducer {
    template: EventRecord,
}

impl StaticProducer {
    pub fn new(template: EventRecord) -> Self {
        Self { template }
    }
}

#[async_trait::async_trait]
impl Producer for StaticProducer {
    async fn produce(&self) -> Result<Vec<EventRecord>> {
        Ok(vec![self.template.clone()])
    }
}

/// Polls `producer` on a fixed interval and feeds the produced records
/// into the pipeline, stamping each with the poll time. The first poll
/// happens one interval after startup. A failed poll skips that tick;
/// the source stops when the pipeline receiver closes.
pub async fn run_interval_source(
    interval: Duration,
    producer: Arc<dyn Producer>,
    pipeline_tx: PipelineSender,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The immediate first tick; polls start one interval in.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let records = match producer.produce().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Producer poll failed: {}", e);
                continue;
            }
        };

        debug!("Producer returned {} records", records.len());

        for mut record in records {
            record.set(TIMESTAMP_FIELD, unix_seconds_now());
            if pipeline_tx.send(record).await.is_err() {
                warn!("Pipeline receiver closed, stopping interval source");
                return Ok(());
            }
        }
    }
}

fn unix_seconds_now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::pipeline::create_pipeline_channel;

    struct FailThenEmit;

    #[async_trait::async_trait]
    impl Producer for FailThenEmit {
        async fn produce(&self) -> Result<Vec<EventRecord>> {
            static POLLS: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);
            if POLLS.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                return Err(AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "connection refused",
                )));
            }
            let mut record = EventRecord::new();
            record.set("message", "recovered");
            Ok(vec![record])
        }
    }

    #[tokio::test]
    async fn test_polls_template_and_stamps_timestamp() {
        let (pipeline_tx, mut pipeline_rx) = create_pipeline_channel(8);

        let mut template = EventRecord::new();
        template.set("message", "tick");
        template.set("level", "info");

        let handle = tokio::spawn(run_interval_source(
            Duration::from_millis(5),
            Arc::new(StaticProducer::new(template)),
            pipeline_tx,
        ));

        let record = pipeline_rx.recv().await.unwrap();
        assert_eq!(record.get("message"), Some("tick"));
        assert_eq!(record.get("level"), Some("info"));
        assert!(record.contains(TIMESTAMP_FIELD));

        // Each tick produces a fresh record.
        let next = pipeline_rx.recv().await.unwrap();
        assert_eq!(next.get("message"), Some("tick"));

        drop(pipeline_rx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failed_poll_skips_tick_and_recovers() {
        let (pipeline_tx, mut pipeline_rx) = create_pipeline_channel(8);

        let handle = tokio::spawn(run_interval_source(
            Duration::from_millis(5),
            Arc::new(FailThenEmit),
            pipeline_tx,
        ));

        // The first poll errors; the source keeps going and the second
        // poll's record comes through.
        let record = pipeline_rx.recv().await.unwrap();
        assert_eq!(record.get("message"), Some("recovered"));

        drop(pipeline_rx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_stops_when_receiver_closes() {
        let (pipeline_tx, pipeline_rx) = create_pipeline_channel(1);

        let mut template = EventRecord::new();
        template.set("message", "tick");

        drop(pipeline_rx);

        let handle = tokio::spawn(run_interval_source(
            Duration::from_millis(1),
            Arc::new(StaticProducer::new(template)),
            pipeline_tx,
        ));

        handle.await.unwrap().unwrap();
    }
}
