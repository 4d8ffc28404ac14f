pub mod event;
pub mod executor;
pub mod processors;

use event::EventRecord;
use tokio::sync::mpsc;

pub type PipelineSender = mpsc::Sender<EventRecord>;
pub type PipelineReceiver = mpsc::Receiver<EventRecord>;

pub fn create_pipeline_channel(buffer_size: usize) -> (PipelineSender, PipelineReceiver) {
    mpsc::channel(buffer_size)
}
