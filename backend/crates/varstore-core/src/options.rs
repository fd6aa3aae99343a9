//! Per-call read options and the failure policy passed down to serializers.

use crate::error::Result;

/// Options accepted by `Variable::read_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Prefer the sample artifact and bound the result to `sample_count` rows.
    pub sample: bool,
    /// Row bound for sampled reads; the configured default applies when unset.
    pub sample_count: Option<usize>,
    /// Surface read failures instead of falling back to defaults.
    pub strict: bool,
    /// Frame analysis documents to load; all of them when unset.
    pub analysis_keys: Option<Vec<String>>,
}

impl ReadOptions {
    pub fn sampled() -> Self {
        Self {
            sample: true,
            ..Default::default()
        }
    }

    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample = true;
        self.sample_count = Some(count);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn with_analysis_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.analysis_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }
}

/// What a serializer does with a recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Propagate,
    LogAndContinue,
}

impl FailurePolicy {
    /// Propagate `result`, or log its error under `context` and carry on.
    pub fn absorb(self, result: Result<()>, context: &str) -> Result<()> {
        match (self, result) {
            (_, Ok(())) => Ok(()),
            (FailurePolicy::Propagate, Err(e)) => Err(e),
            (FailurePolicy::LogAndContinue, Err(e)) => {
                log::error!("{}: {}", context, e);
                Ok(())
            }
        }
    }

    pub fn is_strict(self) -> bool {
        self == FailurePolicy::Propagate
    }
}
