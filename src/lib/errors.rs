use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("Document error: {0}")]
    Dom(String),
}

/// Collapses the failure of a side effect the primary flow does not depend on
/// (focus restore, storage writes) into a debug log entry.
pub trait BestEffort {
    fn best_effort(self, action: &'static str);
}

impl<T> BestEffort for Result<T, AppError> {
    fn best_effort(self, action: &'static str) {
        if let Err(err) = self {
            tracing::debug!(action, error = %err, "best-effort step failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, BestEffort};

    #[test]
    fn display_prefixes_the_failure_kind() {
        assert_eq!(
            AppError::Timeout("slow".to_string()).to_string(),
            "Timeout: slow"
        );
        assert_eq!(
            AppError::Dom("gone".to_string()).to_string(),
            "Document error: gone"
        );
    }

    #[test]
    fn best_effort_swallows_failures() {
        Err::<(), _>(AppError::Dom("detached".to_string())).best_effort("focus restore");
        Ok::<_, AppError>(()).best_effort("focus restore");
    }
}
