use thiserror::Error;

use crate::workflow::WorkflowFailure;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("OpenAI error: {0}")]
    OpenAi(#[from] OpenAiError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowFailure),
}

/// Kernel service errors
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Kernel unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OpenAI API errors
#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Case-study metadata errors
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Failed to parse metadata: {message}")]
    Parse { message: String },

    #[error("Unrecognized case study: {name}")]
    UnknownCaseStudy { name: String },

    #[error("Failed to sign URL for {relative_path}: {message}")]
    SignedUrl {
        relative_path: String,
        message: String,
    },

    #[error("Failed to download {key}: {message}")]
    Download { key: String, message: String },
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        MetadataError::Parse {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// Result type alias for OpenAI operations
pub type OpenAiResult<T> = Result<T, OpenAiError>;

/// Result type alias for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Operation;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }

    #[test]
    fn test_kernel_error_display() {
        let err = KernelError::Unavailable {
            message: "server down".to_string(),
            retries: 3,
        };
        assert_eq!(err.to_string(), "Kernel unavailable: server down (retries: 3)");

        let err = KernelError::Api {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - not found");

        let err = KernelError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_openai_error_display() {
        let err = OpenAiError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - unauthorized");

        let err = OpenAiError::InvalidResponse {
            message: "malformed JSON".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid response: malformed JSON");
    }

    #[test]
    fn test_metadata_error_display() {
        let err = MetadataError::UnknownCaseStudy {
            name: "landsat".to_string(),
        };
        assert_eq!(err.to_string(), "Unrecognized case study: landsat");

        let err = MetadataError::SignedUrl {
            relative_path: "a/b.png".to_string(),
            message: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to sign URL for a/b.png: denied");
    }

    #[test]
    fn test_serde_error_converts_to_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: MetadataError = json_err.into();
        assert!(matches!(err, MetadataError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse metadata"));
    }

    #[test]
    fn test_collaborator_errors_convert_to_app_error() {
        let app_err: AppError = KernelError::Timeout { timeout_ms: 1000 }.into();
        assert!(matches!(app_err, AppError::Kernel(_)));

        let app_err: AppError = OpenAiError::Timeout { timeout_ms: 1000 }.into();
        assert!(matches!(app_err, AppError::OpenAi(_)));

        let app_err: AppError = MetadataError::Parse {
            message: "x".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Metadata(_)));
    }

    #[test]
    fn test_workflow_failure_converts_to_app_error() {
        let failure = WorkflowFailure::new(Operation::ListResearchContexts, "boom");
        let app_err: AppError = failure.into();
        assert!(matches!(app_err, AppError::Workflow(_)));
        assert!(app_err.to_string().contains("boom"));
    }
}
