use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::config::BirdConfig;
use crate::error::Result;
use crate::models::{Attachment, PresignedUploadDescriptor, UploadResult};

/// Pushes attachment bytes to a presigned storage target
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        descriptor: &PresignedUploadDescriptor,
        attachment: &Attachment,
    ) -> Result<UploadResult>;
}

/// Multipart form uploader. Sends no provider credentials: the presigned
/// form fields carry the authorization.
#[derive(Clone)]
pub struct HttpUploader {
    client: Client,
}

impl HttpUploader {
    pub fn new(config: &BirdConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client })
    }

    fn build_form(descriptor: &PresignedUploadDescriptor, attachment: &Attachment) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in descriptor.upload_form_fields.iter() {
            form = form.text(name.to_string(), value.to_string());
        }

        // Storage validates the file part against the signed Content-Type field.
        let content_type = descriptor
            .upload_form_fields
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| attachment.content_type());

        let mut file = Part::bytes(attachment.body.to_vec()).mime_str(&content_type)?;
        if let Some(filename) = attachment.filename() {
            file = file.file_name(filename);
        }

        // Must be the last part of the form.
        Ok(form.part("file", file))
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        descriptor: &PresignedUploadDescriptor,
        attachment: &Attachment,
    ) -> Result<UploadResult> {
        let form = Self::build_form(descriptor, attachment)?;

        tracing::debug!(
            upload_url = %descriptor.upload_url,
            method = %descriptor.upload_method,
            size = attachment.body.len(),
            "Uploading attachment"
        );

        let res = self
            .client
            .post(&descriptor.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(UploadResult { status, body })
    }
}
