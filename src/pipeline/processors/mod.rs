pub mod annotate;
pub mod recode;

use crate::codec::ConversionMode;
use crate::error::Result;
use crate::pipeline::event::EventRecord;
use serde::{Deserialize, Serialize};

/// Whether an event continues downstream after a processor ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepDecision {
    Keep,
    Drop,
}

impl KeepDecision {
    pub fn is_keep(self) -> bool {
        matches!(self, KeepDecision::Keep)
    }
}

/// Processor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ProcessorConfig {
    #[serde(rename = "annotate")]
    Annotate {
        #[serde(rename = "sourceEncoding", default)]
        source_encoding: Option<String>,
        #[serde(rename = "targetEncoding", default)]
        target_encoding: Option<String>,
        #[serde(default)]
        mode: ConversionMode,
    },
    #[serde(rename = "recode")]
    Recode {
        field: String,
        from: String,
        to: String,
        #[serde(default)]
        mode: ConversionMode,
    },
}

/// Trait for event processors
///
/// Processors mutate the record in place; mutations stay visible to the
/// caller even when the decision is `Drop`.
#[async_trait::async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, event: &mut EventRecord) -> Result<KeepDecision>;
}
