use std::env;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub kernel: KernelConfig,
    pub openai: OpenAiConfig,
    pub metadata: MetadataConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Kernel (object storage and directory) service configuration
#[derive(Debug, Clone)]
pub struct KernelConfig {
    pub api_key: String,
    pub base_url: String,
}

/// OpenAI API configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Case-study metadata artifact handling.
///
/// The wrapper line counts describe framing the upstream transport adds around
/// the JSON payload. They are not a stable contract and should be checked
/// against real artifacts when the upstream changes.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub leading_wrapper_lines: usize,
    pub trailing_wrapper_lines: usize,
    pub signed_url_ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let kernel = KernelConfig {
            api_key: required("KERNEL_API_KEY")?,
            base_url: env::var("KERNEL_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        };

        let openai = OpenAiConfig {
            api_key: required("OPENAI_API_KEY")?,
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
        };

        let defaults = MetadataConfig::default();
        let metadata = MetadataConfig {
            leading_wrapper_lines: parsed("METADATA_LEADING_WRAPPER_LINES")
                .unwrap_or(defaults.leading_wrapper_lines),
            trailing_wrapper_lines: parsed("METADATA_TRAILING_WRAPPER_LINES")
                .unwrap_or(defaults.trailing_wrapper_lines),
            signed_url_ttl_secs: parsed("SIGNED_URL_TTL_SECS")
                .unwrap_or(defaults.signed_url_ttl_secs),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let defaults = RequestConfig::default();
        let request = RequestConfig {
            timeout_ms: parsed("REQUEST_TIMEOUT_MS").unwrap_or(defaults.timeout_ms),
            max_retries: parsed("MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_delay_ms: parsed("RETRY_DELAY_MS").unwrap_or(defaults.retry_delay_ms),
        };

        Ok(Config {
            kernel,
            openai,
            metadata,
            logging,
            request,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Config {
        message: format!("{} is required", key),
    })
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            leading_wrapper_lines: 3,
            trailing_wrapper_lines: 2,
            signed_url_ttl_secs: 3600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_config_defaults() {
        let config = RequestConfig::default();
        assert_eq!(config.timeout_ms, 30000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 1000);
    }

    #[test]
    fn test_metadata_config_defaults() {
        let config = MetadataConfig::default();
        assert_eq!(config.leading_wrapper_lines, 3);
        assert_eq!(config.trailing_wrapper_lines, 2);
        assert_eq!(config.signed_url_ttl_secs, 3600);
    }
}
