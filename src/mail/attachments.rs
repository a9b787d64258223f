use crate::config::AttachmentFailurePolicy;
use crate::error::{MailError, Result};
use crate::models::{Attachment, AttachmentManifestEntry};

use super::client::BirdClient;
use super::uploader::Uploader;

/// Uploads attachments one at a time, in order, and collects the manifest.
pub struct AttachmentUploader<'a, C, U> {
    client: &'a C,
    uploader: &'a U,
    policy: AttachmentFailurePolicy,
}

impl<'a, C: BirdClient, U: Uploader> AttachmentUploader<'a, C, U> {
    pub fn new(client: &'a C, uploader: &'a U, policy: AttachmentFailurePolicy) -> Self {
        Self {
            client,
            uploader,
            policy,
        }
    }

    pub async fn upload_all(&self, attachments: &[Attachment]) -> Result<Vec<AttachmentManifestEntry>> {
        let mut manifest = Vec::with_capacity(attachments.len());

        for (index, attachment) in attachments.iter().enumerate() {
            let filename = attachment
                .filename()
                .ok_or(MailError::MissingAttachmentFilename { index })?;

            match self.upload_one(attachment).await {
                Ok(media_url) => {
                    tracing::debug!(index, filename = %filename, "Attachment uploaded");
                    manifest.push(AttachmentManifestEntry {
                        media_url,
                        filename,
                        inline: false,
                    });
                }
                Err(e) if self.policy == AttachmentFailurePolicy::Skip => {
                    tracing::warn!(
                        index,
                        filename = %filename,
                        error = %e,
                        "Attachment upload failed, sending without it"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(manifest)
    }

    /// Presign then upload; returns the provider media URL.
    async fn upload_one(&self, attachment: &Attachment) -> Result<String> {
        let descriptor = self
            .client
            .create_presigned_upload_url(&attachment.content_type())
            .await?;

        let result = self.uploader.upload(&descriptor, attachment).await?;
        if !result.is_success() {
            tracing::warn!(
                status = result.status,
                body = %result.body,
                "Storage rejected attachment upload"
            );
            return Err(MailError::AttachmentUploadFailed);
        }

        Ok(descriptor.media_url)
    }
}
