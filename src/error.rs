#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Email body is empty")]
    EmptyBody,

    #[error("Provider request failed: {0}")]
    ProviderRequest(String),

    #[error("Upload of attachment to storage has failed")]
    AttachmentUploadFailed,

    #[error("Mail not sent: {0}")]
    SendNotSent(String),

    #[error("Attachment #{index} has no Content-Disposition filename")]
    MissingAttachmentFilename { index: usize },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MailError {
    /// Whether the hosting pipeline may requeue the message.
    ///
    /// Failures caused by the message itself (no body, bad attachment headers)
    /// will fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MailError::ProviderRequest(_)
                | MailError::AttachmentUploadFailed
                | MailError::SendNotSent(_)
        )
    }
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::ProviderRequest(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        MailError::ProviderRequest(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
