use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a processor reacts to a partial (lossy) encoding conversion.
///
/// `Strict` aborts the field mutation and surfaces an error; `BestEffort`
/// accepts the substituted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionMode {
    #[default]
    Strict,
    BestEffort,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("malformed input for encoding {0}")]
    MalformedInput(String),

    #[error("partial conversion from {from} to {to}")]
    Incomplete { from: String, to: String },
}

/// Outcome of a conversion. `complete` is false when unmappable characters
/// were substituted on the way to the target encoding.
#[derive(Debug, Clone)]
pub struct Converted {
    pub text: String,
    pub complete: bool,
}

/// Converts field text between two named character encodings.
///
/// The pipeline never transcodes by itself; hosts inject an implementation
/// of this trait and processors call it with explicit encoding names.
pub trait Codec: Send + Sync {
    fn convert(&self, input: &str, from: &str, to: &str) -> Result<Converted, CodecError>;
}

/// One configured conversion plus the policy for partial results.
///
/// Strict mode turns an incomplete conversion into an error so the caller
/// can leave the field untouched; best-effort passes the substituted text
/// through.
pub struct Recoder {
    codec: Arc<dyn Codec>,
    from: String,
    to: String,
    mode: ConversionMode,
}

impl Recoder {
    pub fn new(
        codec: Arc<dyn Codec>,
        from: impl Into<String>,
        to: impl Into<String>,
        mode: ConversionMode,
    ) -> Self {
        Self {
            codec,
            from: from.into(),
            to: to.into(),
            mode,
        }
    }

    pub fn recode(&self, input: &str) -> Result<String, CodecError> {
        let converted = self.codec.convert(input, &self.from, &self.to)?;

        if !converted.complete {
            match self.mode {
                ConversionMode::Strict => {
                    return Err(CodecError::Incomplete {
                        from: self.from.clone(),
                        to: self.to.clone(),
                    });
                }
                ConversionMode::BestEffort => {
                    tracing::debug!("lossy conversion from {} to {}", self.from, self.to);
                }
            }
        }

        Ok(converted.text)
    }
}

/// Built-in fallback collaborator. Handles the identity case plus an
/// `ascii` target, substituting `?` for unmappable characters. Anything
/// beyond that needs a host-provided [`Codec`].
pub struct PassthroughCodec;

impl PassthroughCodec {
    fn known(name: &str) -> bool {
        matches!(name, "utf-8" | "utf8" | "ascii" | "us-ascii")
    }

    fn is_ascii_name(name: &str) -> bool {
        matches!(name, "ascii" | "us-ascii")
    }
}

impl Codec for PassthroughCodec {
    fn convert(&self, input: &str, from: &str, to: &str) -> Result<Converted, CodecError> {
        let from = from.to_ascii_lowercase();
        let to = to.to_ascii_lowercase();

        if !Self::known(&from) {
            return Err(CodecError::UnknownEncoding(from));
        }
        if !Self::known(&to) {
            return Err(CodecError::UnknownEncoding(to));
        }

        if !Self::is_ascii_name(&to) {
            return Ok(Converted {
                text: input.to_string(),
                complete: true,
            });
        }

        let mut complete = true;
        let text = input
            .chars()
            .map(|c| {
                if c.is_ascii() {
                    c
                } else {
                    complete = false;
                    '?'
                }
            })
            .collect();

        Ok(Converted { text, complete })
    }
}
