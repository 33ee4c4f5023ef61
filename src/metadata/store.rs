use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{CaseStudyMetadata, MetadataKey, MetadataParser};
use crate::error::{AppResult, MetadataError};
use crate::services::{MetadataStore, RemoteFileDownloader};

/// Metadata store backed by the kernel's generic remote-file download.
#[derive(Clone)]
pub struct KernelMetadataStore {
    downloader: Arc<dyn RemoteFileDownloader>,
    parser: MetadataParser,
}

impl KernelMetadataStore {
    pub fn new(downloader: Arc<dyn RemoteFileDownloader>, parser: MetadataParser) -> Self {
        Self { downloader, parser }
    }
}

#[async_trait]
impl MetadataStore for KernelMetadataStore {
    async fn fetch(&self, key: MetadataKey) -> AppResult<CaseStudyMetadata> {
        let object_path = key.object_path();

        let raw = self
            .downloader
            .download(&object_path)
            .await
            .map_err(|e| MetadataError::Download {
                key: object_path.clone(),
                message: e.to_string(),
            })?;

        let metadata = self.parser.parse(&raw).await?;

        info!(
            key = %object_path,
            bytes = raw.len(),
            keyframes = metadata.keyframe_count(),
            "Fetched case study metadata"
        );

        Ok(metadata)
    }
}
