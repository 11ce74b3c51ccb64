use thiserror::Error;

/// Failures that abort a whole run operation (drain, reconcile, terminate).
///
/// Per-topic generation failures are not in here: they are counted against
/// the run and the batch keeps going.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
}

impl RunError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn store(error: anyhow::Error) -> Self {
        tracing::error!(error = %error, "Run store unavailable");
        Self::StoreUnavailable(error)
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

pub type RunResult<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_displays_bare_message() {
        let err = RunError::invalid("runId is required");
        assert_eq!(err.to_string(), "runId is required");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn store_error_keeps_cause() {
        let err = RunError::store(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Store unavailable: connection refused");
        assert!(!err.is_invalid_argument());
    }
}
