use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("local storage unavailable")]
    Unavailable,

    #[error("storage write rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("endpoint responded with HTTP {0}")]
    Status(u16),

    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_converts_into_submit_error() {
        let err: SubmitError = StorageError::Rejected("QuotaExceededError".to_string()).into();
        assert!(matches!(err, SubmitError::Storage(_)));
        assert_eq!(err.to_string(), "storage write rejected: QuotaExceededError");
    }

    #[test]
    fn status_error_display() {
        assert_eq!(
            SubmitError::Status(503).to_string(),
            "endpoint responded with HTTP 503"
        );
    }
}
