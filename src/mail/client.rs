use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;

use crate::config::BirdConfig;
use crate::error::{MailError, Result};
use crate::models::{PresignedUploadDescriptor, PresignedUploadRequest, ProviderPayload, SendResult};

/// Calls against the Bird channels API, scoped to one workspace channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BirdClient: Send + Sync {
    /// Ask the provider for a presigned storage upload target.
    ///
    /// Transport and decode failures are `ProviderRequest`; a non-2xx answer
    /// is `AttachmentUploadFailed`.
    async fn create_presigned_upload_url(&self, content_type: &str)
        -> Result<PresignedUploadDescriptor>;

    /// Submit the message payload. The HTTP status is returned as-is; only
    /// transport failures are errors.
    async fn send_mail(&self, payload: &ProviderPayload) -> Result<SendResult>;
}

/// reqwest-backed [`BirdClient`]
#[derive(Clone)]
pub struct HttpBirdClient {
    client: Client,
    channel_url: String,
}

impl HttpBirdClient {
    pub fn new(config: &BirdConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_key))
            .map_err(|_| {
                MailError::InvalidConfig("access key is not a valid header value".to_string())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            channel_url: config.channel_url(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.channel_url, path)
    }
}

#[async_trait]
impl BirdClient for HttpBirdClient {
    async fn create_presigned_upload_url(
        &self,
        content_type: &str,
    ) -> Result<PresignedUploadDescriptor> {
        let res = self
            .client
            .post(self.endpoint("presigned-upload"))
            .json(&PresignedUploadRequest { content_type })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                content_type = %content_type,
                "Bird presigned upload request rejected"
            );
            return Err(MailError::AttachmentUploadFailed);
        }

        let descriptor = res.json::<PresignedUploadDescriptor>().await?;
        tracing::debug!(
            upload_url = %descriptor.upload_url,
            fields = descriptor.upload_form_fields.len(),
            "Presigned upload URL issued"
        );

        Ok(descriptor)
    }

    async fn send_mail(&self, payload: &ProviderPayload) -> Result<SendResult> {
        let res = self
            .client
            .post(self.endpoint("messages"))
            .json(payload)
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(SendResult { status, body })
    }
}
