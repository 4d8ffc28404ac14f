use super::{KeepDecision, Processor};
use crate::codec::Recoder;
use crate::error::Result;
use crate::pipeline::event::EventRecord;

pub const MESSAGE_FIELD: &str = "message";
pub const MESSAGE_MARKER: &str = " [processed by filter stage]";
pub const CUSTOM_FIELD: &str = "custom_field";
pub const CUSTOM_FIELD_VALUE: &str = "example_value";
pub const LEVEL_FIELD: &str = "level";
pub const DROP_LEVEL: &str = "debug";

/// Annotate processor: marks the message field, stamps a fixed custom
/// field and drops debug-level events.
///
/// The mutations run before the level check, so a dropped record still
/// carries them when the host inspects it. Re-applying the processor
/// appends another copy of the marker; there is no idempotence guarantee.
pub struct AnnotateProcessor {
    recoder: Option<Recoder>,
}

impl AnnotateProcessor {
    pub fn new() -> Self {
        Self { recoder: None }
    }

    /// Runs the message through an encoding conversion before annotating.
    pub fn with_recoder(recoder: Recoder) -> Self {
        Self {
            recoder: Some(recoder),
        }
    }
}

impl Default for AnnotateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Processor for AnnotateProcessor {
    async fn process(&self, event: &mut EventRecord) -> Result<KeepDecision> {
        if let Some(message) = event.get(MESSAGE_FIELD) {
            let message = match &self.recoder {
                Some(recoder) => recoder.recode(message)?,
                None => message.to_string(),
            };
            event.set(MESSAGE_FIELD, format!("{message}{MESSAGE_MARKER}"));
        }

        event.set(CUSTOM_FIELD, CUSTOM_FIELD_VALUE);

        if event.get(LEVEL_FIELD) == Some(DROP_LEVEL) {
            return Ok(KeepDecision::Drop);
        }

        Ok(KeepDecision::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ConversionMode, PassthroughCodec};
    use crate::error::AppError;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_info_event_annotated_and_kept() {
        let annotate = AnnotateProcessor::new();

        let mut record = EventRecord::new();
        record.set("message", "hello");
        record.set("level", "info");

        let decision = annotate.process(&mut record).await.unwrap();

        assert!(decision.is_keep());
        assert_eq!(
            record.get("message"),
            Some("hello [processed by filter stage]")
        );
        assert_eq!(record.get("level"), Some("info"));
        assert_eq!(record.get("custom_field"), Some("example_value"));
    }

    #[tokio::test]
    async fn test_debug_event_dropped_but_still_mutated() {
        let annotate = AnnotateProcessor::new();

        let mut record = EventRecord::new();
        record.set("level", "debug");

        let decision = annotate.process(&mut record).await.unwrap();

        assert_eq!(decision, KeepDecision::Drop);
        // No message field was created, but the stamp still landed.
        assert_eq!(record.get("message"), None);
        assert_eq!(record.get("custom_field"), Some("example_value"));
        assert_eq!(record.get("level"), Some("debug"));
    }

    #[tokio::test]
    async fn test_empty_record_kept() {
        let annotate = AnnotateProcessor::new();

        let mut record = EventRecord::new();
        let decision = annotate.process(&mut record).await.unwrap();

        assert!(decision.is_keep());
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("custom_field"), Some("example_value"));
    }

    #[tokio::test]
    async fn test_absent_level_kept() {
        let annotate = AnnotateProcessor::new();

        let mut record = EventRecord::new();
        record.set("message", "no level here");

        let decision = annotate.process(&mut record).await.unwrap();
        assert!(decision.is_keep());
    }

    #[tokio::test]
    async fn test_non_debug_levels_kept() {
        let annotate = AnnotateProcessor::new();

        for level in ["info", "warn", "error", "trace", ""] {
            let mut record = EventRecord::new();
            record.set("level", level);
            let decision = annotate.process(&mut record).await.unwrap();
            assert!(decision.is_keep(), "level {level:?} should be kept");
        }
    }

    #[tokio::test]
    async fn test_double_application_double_appends() {
        let annotate = AnnotateProcessor::new();

        let mut record = EventRecord::new();
        record.set("message", "hello");

        annotate.process(&mut record).await.unwrap();
        annotate.process(&mut record).await.unwrap();

        assert_eq!(
            record.get("message"),
            Some("hello [processed by filter stage] [processed by filter stage]")
        );
    }

    #[tokio::test]
    async fn test_custom_field_overwritten() {
        let annotate = AnnotateProcessor::new();

        let mut record = EventRecord::new();
        record.set("custom_field", "stale");

        annotate.process(&mut record).await.unwrap();
        assert_eq!(record.get("custom_field"), Some("example_value"));
    }

    #[tokio::test]
    async fn test_recoding_best_effort() {
        let recoder = Recoder::new(
            Arc::new(PassthroughCodec),
            "utf-8",
            "ascii",
            ConversionMode::BestEffort,
        );
        let annotate = AnnotateProcessor::with_recoder(recoder);

        let mut record = EventRecord::new();
        record.set("message", "héllo");

        let decision = annotate.process(&mut record).await.unwrap();

        assert!(decision.is_keep());
        assert_eq!(
            record.get("message"),
            Some("h?llo [processed by filter stage]")
        );
    }

    #[tokio::test]
    async fn test_recoding_strict_aborts_mutation() {
        let recoder = Recoder::new(
            Arc::new(PassthroughCodec),
            "utf-8",
            "ascii",
            ConversionMode::Strict,
        );
        let annotate = AnnotateProcessor::with_recoder(recoder);

        let mut record = EventRecord::new();
        record.set("message", "héllo");

        let err = annotate.process(&mut record).await.unwrap_err();

        assert!(matches!(err, AppError::Codec(_)));
        // The message keeps its prior value.
        assert_eq!(record.get("message"), Some("héllo"));
    }
}
