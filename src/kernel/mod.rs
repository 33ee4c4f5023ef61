//! Client for the kernel service: research-context and conversation
//! directories, source-data listing, and object-storage access.

mod client;
mod types;

pub use client::KernelClient;
pub use types::{CreateConversationRequest, SignedUrlRequest, SignedUrlResponse};
