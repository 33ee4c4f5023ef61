use serde::{Deserialize, Serialize};

/// Body of `POST /research-contexts/{id}/conversations`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateConversationRequest {
    pub title: String,
}

/// Body of `POST /files/signed-url`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequest {
    pub relative_path: String,
    pub expires_in_seconds: u64,
}

/// Response of `POST /files/signed-url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub signed_url: String,
}
