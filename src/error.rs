use std::time::Duration;

/// Failures surfaced by the reply pipeline.
///
/// Everything here ends the current generation. Policy violations and
/// over-length drafts are not errors: the retry loop handles them.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// The endpoint answered but the first choice carried no content.
    #[error("no completion content received from model {model}")]
    EmptyCompletion { model: String },

    /// Transport, auth or rate-limit failure reported by the provider.
    #[error("provider request failed: {0:#}")]
    Provider(#[source] anyhow::Error),

    /// Topic posts need both a topic list and an adjective list.
    #[error("persona has no {field} configured for topic posts")]
    MissingTopicList { field: &'static str },

    /// The optional regeneration cap was hit before a draft was accepted.
    #[error("reply still rejected after {attempts} regeneration(s)")]
    AttemptsExhausted { attempts: u32 },

    /// The caller-supplied deadline elapsed mid-generation.
    #[error("reply generation exceeded deadline of {after:?}")]
    DeadlineExceeded { after: Duration },
}

pub type Result<T> = std::result::Result<T, ReplyError>;
