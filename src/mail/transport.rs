use std::fmt;

use async_trait::async_trait;
use tracing::Instrument;

use crate::config::AttachmentFailurePolicy;
use crate::error::{MailError, Result};
use crate::models::{ProviderPayload, SentMessage};

use super::attachments::AttachmentUploader;
use super::client::BirdClient;
use super::mapper::{map_body, map_metadata, map_receivers};
use super::uploader::Uploader;

/// Contract the dispatch pipeline uses to hand a message to a transport.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &SentMessage) -> Result<()>;

    /// Short identifier the pipeline selects this transport by.
    fn name(&self) -> &'static str;
}

/// Delivers messages through the Bird channels API.
///
/// Stateless between sends: one instance can be shared by concurrent tasks.
pub struct BirdTransport<C, U> {
    client: C,
    uploader: U,
    attachment_policy: AttachmentFailurePolicy,
}

impl<C: BirdClient, U: Uploader> BirdTransport<C, U> {
    pub const NAME: &'static str = "bird";

    pub fn new(client: C, uploader: U) -> Self {
        Self {
            client,
            uploader,
            attachment_policy: AttachmentFailurePolicy::default(),
        }
    }

    pub fn with_attachment_policy(mut self, policy: AttachmentFailurePolicy) -> Self {
        self.attachment_policy = policy;
        self
    }

    /// Map, upload attachments, then submit. Any failure stops the send.
    pub async fn do_send(&self, message: &SentMessage) -> Result<()> {
        let email = message.email();

        let contacts = map_receivers(&email.to);
        let body = map_body(email)?.with_metadata(map_metadata(email));

        let manifest = AttachmentUploader::new(&self.client, &self.uploader, self.attachment_policy)
            .upload_all(&email.attachments)
            .await?;

        let payload = ProviderPayload::new(contacts, body.with_attachments(manifest));

        let result = self
            .client
            .send_mail(&payload)
            .await
            .map_err(|e| MailError::SendNotSent(e.to_string()))?;

        if !result.is_success() {
            return Err(MailError::SendNotSent(format!(
                "provider returned {}: {}",
                result.status, result.body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<C: BirdClient, U: Uploader> MailTransport for BirdTransport<C, U> {
    async fn send(&self, message: &SentMessage) -> Result<()> {
        let email = message.email();
        let span = tracing::info_span!(
            "bird_send",
            send_id = %uuid::Uuid::new_v4(),
            recipients = email.to.len(),
            attachments = email.attachments.len(),
        );

        async {
            match self.do_send(message).await {
                Ok(()) => {
                    tracing::info!("Mail accepted by Bird");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, retryable = e.is_retryable(), "Mail not sent");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl<C: BirdClient, U: Uploader> fmt::Display for BirdTransport<C, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::client::MockBirdClient;
    use crate::mail::uploader::MockUploader;
    use crate::models::{
        Address, Attachment, OutgoingEmail, PresignedUploadDescriptor, SendResult, UploadFormData,
        UploadResult,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn accepted() -> SendResult {
        SendResult {
            status: 202,
            body: r#"{"id":"msg-1"}"#.to_string(),
        }
    }

    fn descriptor(id: usize) -> PresignedUploadDescriptor {
        PresignedUploadDescriptor {
            media_url: format!("https://media.bird.com/{}", id),
            upload_url: "https://bucket.s3.amazonaws.com".to_string(),
            upload_method: "POST".to_string(),
            upload_form_fields: UploadFormData::from_iter([("Content-Type", "application/pdf")]),
        }
    }

    fn simple_email() -> OutgoingEmail {
        OutgoingEmail::builder()
            .to(Address::new("a@x.com"))
            .subject("Hi")
            .html("<p>hi</p>")
            .build()
            .unwrap()
    }

    /// Client double that records every payload handed to `send_mail`.
    fn capturing_client(captured: Arc<Mutex<Vec<serde_json::Value>>>) -> MockBirdClient {
        let mut client = MockBirdClient::new();
        client.expect_send_mail().times(1).returning(move |payload| {
            captured
                .lock()
                .unwrap()
                .push(serde_json::to_value(payload).unwrap());
            Ok(accepted())
        });
        client
    }

    #[tokio::test]
    async fn test_send_simple_html_payload() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let client = capturing_client(captured.clone());
        let transport = BirdTransport::new(client, MockUploader::new());

        transport
            .send(&SentMessage::new(simple_email()))
            .await
            .expect("Should send");

        let payloads = captured.lock().unwrap();
        assert_eq!(
            payloads[0],
            json!({
                "receiver": {"contacts": [{"identifierKey": "emailaddress", "identifierValue": "a@x.com"}]},
                "body": {"type": "html", "html": {"html": "<p>hi</p>", "metadata": {"subject": "Hi"}}}
            })
        );
    }

    #[tokio::test]
    async fn test_text_body_payload_shape() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let client = capturing_client(captured.clone());
        let transport = BirdTransport::new(client, MockUploader::new());

        let email = OutgoingEmail::builder()
            .to(Address::new("a@x.com"))
            .subject("Test Subject")
            .text("Test Body")
            .build()
            .unwrap();

        transport
            .send(&SentMessage::new(email))
            .await
            .expect("Should send");

        let payloads = captured.lock().unwrap();
        assert_eq!(
            payloads[0]["body"],
            json!({"type": "text", "text": {"text": "Test Body", "metadata": {"subject": "Test Subject"}}})
        );
    }

    #[tokio::test]
    async fn test_empty_body_never_contacts_provider() {
        let mut client = MockBirdClient::new();
        client.expect_send_mail().never();
        client.expect_create_presigned_upload_url().never();
        let mut uploader = MockUploader::new();
        uploader.expect_upload().never();

        let email = OutgoingEmail::builder()
            .to(Address::new("a@x.com"))
            .subject("Hi")
            .attach(Attachment::new(&b"x"[..], "x.pdf", "application/pdf"))
            .build()
            .unwrap();

        let result = BirdTransport::new(client, uploader)
            .do_send(&SentMessage::new(email))
            .await;

        assert!(matches!(result, Err(MailError::EmptyBody)));
    }

    #[tokio::test]
    async fn test_attachments_merged_in_order() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut client = capturing_client(captured.clone());
        let counter = Arc::new(Mutex::new(0usize));
        client
            .expect_create_presigned_upload_url()
            .times(3)
            .returning(move |_| {
                let mut n = counter.lock().unwrap();
                *n += 1;
                Ok(descriptor(*n))
            });
        let mut uploader = MockUploader::new();
        uploader.expect_upload().times(3).returning(|_, _| {
            Ok(UploadResult {
                status: 204,
                body: String::new(),
            })
        });

        let email = OutgoingEmail::builder()
            .to(Address::new("a@x.com"))
            .html("<p>files</p>")
            .attach(Attachment::new(&b"1"[..], "a.pdf", "application/pdf"))
            .attach(Attachment::new(&b"2"[..], "b.pdf", "application/pdf"))
            .attach(Attachment::new(&b"3"[..], "c.pdf", "application/pdf"))
            .build()
            .unwrap();

        BirdTransport::new(client, uploader)
            .do_send(&SentMessage::new(email))
            .await
            .expect("Should send");

        let payloads = captured.lock().unwrap();
        assert_eq!(
            payloads[0]["body"]["html"]["attachments"],
            json!([
                {"mediaUrl": "https://media.bird.com/1", "filename": "a.pdf", "inline": false},
                {"mediaUrl": "https://media.bird.com/2", "filename": "b.pdf", "inline": false},
                {"mediaUrl": "https://media.bird.com/3", "filename": "c.pdf", "inline": false}
            ])
        );
    }

    #[tokio::test]
    async fn test_presign_network_error_skips_send() {
        let mut client = MockBirdClient::new();
        client
            .expect_create_presigned_upload_url()
            .times(1)
            .returning(|_| Err(MailError::ProviderRequest("connection refused".to_string())));
        client.expect_send_mail().never();

        let mut email = simple_email();
        email
            .attachments
            .push(Attachment::new(&b"x"[..], "x.pdf", "application/pdf"));

        let result = BirdTransport::new(client, MockUploader::new())
            .do_send(&SentMessage::new(email))
            .await;

        assert!(matches!(result, Err(MailError::ProviderRequest(_))));
    }

    #[tokio::test]
    async fn test_rejected_upload_skips_send() {
        let mut client = MockBirdClient::new();
        client
            .expect_create_presigned_upload_url()
            .returning(|_| Ok(descriptor(1)));
        client.expect_send_mail().never();
        let mut uploader = MockUploader::new();
        uploader.expect_upload().returning(|_, _| {
            Ok(UploadResult {
                status: 403,
                body: "<Error/>".to_string(),
            })
        });

        let mut email = simple_email();
        email
            .attachments
            .push(Attachment::new(&b"x"[..], "x.pdf", "application/pdf"));

        let result = BirdTransport::new(client, uploader)
            .do_send(&SentMessage::new(email))
            .await;

        assert!(matches!(result, Err(MailError::AttachmentUploadFailed)));
    }

    #[tokio::test]
    async fn test_skip_policy_sends_without_failed_attachment() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut client = capturing_client(captured.clone());
        client
            .expect_create_presigned_upload_url()
            .returning(|_| Ok(descriptor(1)));
        let mut uploader = MockUploader::new();
        uploader.expect_upload().returning(|_, _| {
            Ok(UploadResult {
                status: 500,
                body: String::new(),
            })
        });

        let mut email = simple_email();
        email
            .attachments
            .push(Attachment::new(&b"x"[..], "x.pdf", "application/pdf"));

        BirdTransport::new(client, uploader)
            .with_attachment_policy(AttachmentFailurePolicy::Skip)
            .do_send(&SentMessage::new(email))
            .await
            .expect("Should send without the attachment");

        let payloads = captured.lock().unwrap();
        assert!(payloads[0]["body"]["html"].get("attachments").is_none());
    }

    #[tokio::test]
    async fn test_unsuccessful_send_outcome() {
        let mut client = MockBirdClient::new();
        client.expect_send_mail().times(1).returning(|_| {
            Ok(SendResult {
                status: 422,
                body: r#"{"code":"InvalidPayload"}"#.to_string(),
            })
        });

        let email = OutgoingEmail::builder()
            .from(Address::with_name("shop@x.com", "Shop"))
            .to(Address::new("a@x.com"))
            .subject("Test Subject")
            .text("Test Body")
            .build()
            .unwrap();

        let result = BirdTransport::new(client, MockUploader::new())
            .do_send(&SentMessage::new(email))
            .await;

        assert!(matches!(result, Err(MailError::SendNotSent(msg)) if msg.contains("422") && msg.contains("InvalidPayload")));
    }

    #[tokio::test]
    async fn test_send_transport_error_becomes_not_sent() {
        let mut client = MockBirdClient::new();
        client
            .expect_send_mail()
            .times(1)
            .returning(|_| Err(MailError::ProviderRequest("operation timed out".to_string())));

        let result = BirdTransport::new(client, MockUploader::new())
            .send(&SentMessage::new(simple_email()))
            .await;

        assert!(matches!(result, Err(MailError::SendNotSent(msg)) if msg.contains("operation timed out")));
    }

    #[test]
    fn test_transport_identity() {
        let transport = BirdTransport::new(MockBirdClient::new(), MockUploader::new());

        assert_eq!(transport.to_string(), "bird");
        assert_eq!(transport.name(), "bird");
    }
}
