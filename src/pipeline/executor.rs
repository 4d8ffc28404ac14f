use crate::codec::{Codec, Recoder};
use crate::config::{AppConfig, Pipeline};
use crate::error::{AppError, Result};
use crate::pipeline::event::EventRecord;
use crate::pipeline::processors::{
    annotate::AnnotateProcessor, recode::RecodeProcessor, KeepDecision, Processor, ProcessorConfig,
};
use crate::pipeline::{PipelineReceiver, PipelineSender};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct PipelineExecutor {
    pipelines: Vec<PipelineInstance>,
}

struct PipelineInstance {
    processors: Vec<Box<dyn Processor>>,
}

impl PipelineExecutor {
    pub fn new(config: &AppConfig, codec: Arc<dyn Codec>) -> Result<Self> {
        let mut pipelines = Vec::new();

        for pipeline_config in &config.pipelines {
            let pipeline = Self::create_pipeline(pipeline_config, &codec)?;
            pipelines.push(pipeline);
        }

        Ok(Self { pipelines })
    }

    fn create_pipeline(
        pipeline_config: &Pipeline,
        codec: &Arc<dyn Codec>,
    ) -> Result<PipelineInstance> {
        let mut processors: Vec<Box<dyn Processor>> = Vec::new();

        for processor_config in &pipeline_config.processors {
            match processor_config {
                ProcessorConfig::Annotate {
                    source_encoding,
                    target_encoding,
                    mode,
                } => {
                    let annotate = match (source_encoding, target_encoding) {
                        (Some(from), Some(to)) => AnnotateProcessor::with_recoder(Recoder::new(
                            Arc::clone(codec),
                            from.clone(),
                            to.clone(),
                            *mode,
                        )),
                        (None, None) => AnnotateProcessor::new(),
                        _ => {
                            return Err(AppError::Config(
                                "annotate: sourceEncoding and targetEncoding must be set together"
                                    .to_string(),
                            ))
                        }
                    };
                    processors.push(Box::new(annotate));
                }
                ProcessorConfig::Recode {
                    field,
                    from,
                    to,
                    mode,
                } => {
                    let recoder = Recoder::new(Arc::clone(codec), from.clone(), to.clone(), *mode);
                    processors.push(Box::new(RecodeProcessor::new(field.clone(), recoder)));
                }
            }
        }

        Ok(PipelineInstance { processors })
    }

    /// Consumes records from `receiver`, runs each through every pipeline
    /// and forwards kept records to `output`. Dropped records are
    /// discarded after mutation; processor errors discard the record for
    /// that pipeline only.
    pub async fn run(self, mut receiver: PipelineReceiver, output: PipelineSender) {
        info!("Pipeline executor started with {} pipelines", self.pipelines.len());

        while let Some(event) = receiver.recv().await {
            for (idx, pipeline) in self.pipelines.iter().enumerate() {
                let mut record = event.clone();

                match Self::process_event(&mut record, pipeline).await {
                    Ok(KeepDecision::Keep) => {
                        debug!("Event kept by pipeline {}", idx);
                        if output.send(record).await.is_err() {
                            info!("Output receiver closed, stopping executor");
                            return;
                        }
                    }
                    Ok(KeepDecision::Drop) => {
                        debug!("Event dropped by pipeline {}", idx);
                    }
                    Err(e) => {
                        error!("Error processing event in pipeline {}: {}", idx, e);
                    }
                }
            }
        }

        info!("Pipeline executor stopped");
    }

    async fn process_event(
        record: &mut EventRecord,
        pipeline: &PipelineInstance,
    ) -> Result<KeepDecision> {
        for (idx, processor) in pipeline.processors.iter().enumerate() {
            match processor.process(record).await? {
                KeepDecision::Keep => {
                    debug!("Event passed through processor {}", idx);
                }
                KeepDecision::Drop => {
                    debug!("Event dropped by processor {}", idx);
                    return Ok(KeepDecision::Drop);
                }
            }
        }

        Ok(KeepDecision::Keep)
    }
}
