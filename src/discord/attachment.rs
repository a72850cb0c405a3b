use async_trait::async_trait;
use futures::StreamExt;
use log::debug;

use super::errors::AttachmentError;

/// An attachment as it arrived on the command: where it lives and what it claims to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub url: String,
    pub filename: String,
    pub content_type: Option<String>,
}

impl From<&serenity::model::channel::Attachment> for AttachmentRef {
    fn from(attachment: &serenity::model::channel::Attachment) -> Self {
        Self {
            url: attachment.url.clone(),
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
        }
    }
}

#[async_trait]
pub trait AttachmentSource: Send + Sync {
    /// Returns the whole body behind `url` as one buffer.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, AttachmentError>;
}

pub struct ReqwestAttachmentSource {
    client: reqwest::Client,
}

impl ReqwestAttachmentSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AttachmentSource for ReqwestAttachmentSource {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, AttachmentError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AttachmentError::Status(response.status()));
        }

        let mut buffer = Vec::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        debug!("Fetched {} bytes from {}", buffer.len(), url);
        Ok(buffer)
    }
}
