use super::{KeepDecision, Processor};
use crate::codec::Recoder;
use crate::error::Result;
use crate::pipeline::event::EventRecord;

/// Recode processor: converts one field's text between two named
/// character encodings. Records always continue downstream; an absent
/// field is a no-op.
pub struct RecodeProcessor {
    field: String,
    recoder: Recoder,
}

impl RecodeProcessor {
    pub fn new(field: impl Into<String>, recoder: Recoder) -> Self {
        Self {
            field: field.into(),
            recoder,
        }
    }
}

#[async_trait::async_trait]
impl Processor for RecodeProcessor {
    async fn process(&self, event: &mut EventRecord) -> Result<KeepDecision> {
        if let Some(value) = event.get(&self.field) {
            let converted = self.recoder.recode(value)?;
            event.set(self.field.as_str(), converted);
        }

        Ok(KeepDecision::Keep)
    }
}
