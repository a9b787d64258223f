pub mod attachments;
pub mod client;
pub mod mapper;
pub mod transport;
pub mod uploader;

pub use attachments::AttachmentUploader;
pub use client::{BirdClient, HttpBirdClient};
pub use transport::{BirdTransport, MailTransport};
pub use uploader::{HttpUploader, Uploader};

use crate::config::BirdConfig;
use crate::error::Result;
use crate::models::{OutgoingEmail, SentMessage};

/// Mailer backed by the HTTP Bird transport
pub struct Mailer {
    inner: BirdTransport<HttpBirdClient, HttpUploader>,
}

impl Mailer {
    pub fn new(config: &BirdConfig) -> Result<Self> {
        let transport = BirdTransport::new(HttpBirdClient::new(config)?, HttpUploader::new(config)?)
            .with_attachment_policy(config.attachment_policy);

        Ok(Self { inner: transport })
    }

    pub async fn send(&self, email: OutgoingEmail) -> Result<()> {
        self.inner.send(&SentMessage::new(email)).await
    }

    pub fn transport(&self) -> &BirdTransport<HttpBirdClient, HttpUploader> {
        &self.inner
    }
}
