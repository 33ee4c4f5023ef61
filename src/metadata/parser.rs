use chrono::{Duration, Utc};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{CaseStudyMetadata, CaseStudyName, ImageEntry};
use crate::config::MetadataConfig;
use crate::error::{MetadataError, MetadataResult};
use crate::services::SignedUrlProvider;

/// Turns a downloaded metadata artifact into validated [`CaseStudyMetadata`].
#[derive(Clone)]
pub struct MetadataParser {
    config: MetadataConfig,
    signer: Arc<dyn SignedUrlProvider>,
}

impl MetadataParser {
    /// Create a parser that signs image URLs through `signer`.
    pub fn new(config: MetadataConfig, signer: Arc<dyn SignedUrlProvider>) -> Self {
        Self { config, signer }
    }

    /// Parse a raw artifact: strip wrapper lines, validate the payload, sign
    /// every image URL and stamp a fresh expiration time.
    ///
    /// A failure to sign any single image aborts the whole parse.
    pub async fn parse(&self, raw: &[u8]) -> MetadataResult<CaseStudyMetadata> {
        let text = std::str::from_utf8(raw).map_err(|e| MetadataError::Parse {
            message: format!("artifact is not valid UTF-8: {}", e),
        })?;

        let mut metadata = self.decode(&self.strip_wrapper(text))?;
        let ttl = self.config.signed_url_ttl_secs;
        let expiration = i64::try_from(ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| MetadataError::Parse {
                message: format!("signed URL lifetime of {}s is out of range", ttl),
            })?;

        for entry in metadata.images_mut() {
            if let ImageEntry::Image(image) = entry {
                let url = self
                    .signer
                    .signed_url(&image.relative_path, ttl)
                    .await
                    .map_err(|e| {
                        warn!(relative_path = %image.relative_path, error = %e, "Image signing failed");
                        MetadataError::SignedUrl {
                            relative_path: image.relative_path.clone(),
                            message: e.to_string(),
                        }
                    })?;
                image.signed_url = Some(url);
            }
        }

        metadata.set_expiration_time(expiration.timestamp_millis());

        debug!(
            case_study = %metadata.case_study(),
            keyframes = metadata.keyframe_count(),
            "Parsed case study metadata"
        );

        Ok(metadata)
    }

    /// Drop the configured number of leading and trailing wrapper lines.
    pub fn strip_wrapper(&self, text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        let leading = self.config.leading_wrapper_lines;
        let trailing = self.config.trailing_wrapper_lines;

        if lines.len() <= leading + trailing {
            return String::new();
        }

        lines[leading..lines.len() - trailing].join("\n")
    }

    /// Validate a bare JSON payload against the tagged-union schema.
    pub fn decode(&self, payload: &str) -> MetadataResult<CaseStudyMetadata> {
        let value: serde_json::Value = serde_json::from_str(payload)?;

        let tag = value
            .get("caseStudy")
            .and_then(|v| v.as_str())
            .ok_or_else(|| MetadataError::Parse {
                message: "missing caseStudy discriminant".to_string(),
            })?;
        CaseStudyName::from_str(tag)?;

        Ok(serde_json::from_value(value)?)
    }
}
