use crate::error::Result;
use crate::pipeline::{event::EventRecord, PipelineSender};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Reads one JSON object per line from stdin and feeds each as an
/// `EventRecord` into the pipeline. Field values must be strings; lines
/// that do not parse are skipped with a warning.
pub async fn run_stdin_source(pipeline_tx: PipelineSender) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<EventRecord>(line) {
            Ok(record) => {
                debug!("Read record with {} fields", record.len());
                if pipeline_tx.send(record).await.is_err() {
                    warn!("Pipeline receiver closed, stopping stdin source");
                    break;
                }
            }
            Err(e) => {
                warn!("Skipping malformed input line: {}", e);
            }
        }
    }

    Ok(())
}
