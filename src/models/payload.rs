use serde::Serialize;

/// Request body for `POST .../messages`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPayload {
    pub receiver: Receiver,
    pub body: BodyBlock,
}

impl ProviderPayload {
    pub fn new(contacts: Vec<Contact>, body: BodyBlock) -> Self {
        Self {
            receiver: Receiver { contacts },
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receiver {
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub identifier_key: String,
    pub identifier_value: String,
}

impl Contact {
    pub const EMAIL_IDENTIFIER: &'static str = "emailaddress";

    pub fn email(address: impl Into<String>) -> Self {
        Self {
            identifier_key: Self::EMAIL_IDENTIFIER.to_string(),
            identifier_value: address.into(),
        }
    }
}

/// Message body, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BodyBlock {
    Html { html: HtmlContent },
    Text { text: TextContent },
}

impl BodyBlock {
    pub fn html(html: impl Into<String>) -> Self {
        BodyBlock::Html {
            html: HtmlContent {
                html: html.into(),
                metadata: None,
                attachments: Vec::new(),
            },
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        BodyBlock::Text {
            text: TextContent {
                text: text.into(),
                metadata: None,
                attachments: Vec::new(),
            },
        }
    }

    /// Attach metadata unless it is empty.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        if metadata.is_empty() {
            return self;
        }

        match &mut self {
            BodyBlock::Html { html } => html.metadata = Some(metadata),
            BodyBlock::Text { text } => text.metadata = Some(metadata),
        }
        self
    }

    /// Attach the uploaded-attachment manifest. An empty manifest leaves the body untouched.
    pub fn with_attachments(mut self, attachments: Vec<AttachmentManifestEntry>) -> Self {
        match &mut self {
            BodyBlock::Html { html } => html.attachments = attachments,
            BodyBlock::Text { text } => text.attachments = attachments,
        }
        self
    }

    pub fn attachments(&self) -> &[AttachmentManifestEntry] {
        match self {
            BodyBlock::Html { html } => &html.attachments,
            BodyBlock::Text { text } => &text.attachments,
        }
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            BodyBlock::Html { html } => html.metadata.as_ref(),
            BodyBlock::Text { text } => text.metadata.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmlContent {
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentManifestEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<MetadataHeaders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_from: Option<EmailFrom>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.headers.is_none() && self.email_from.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataHeaders {
    #[serde(rename = "reply-to")]
    pub reply_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailFrom {
    pub display_name: String,
    pub username: String,
}

/// Reference to an attachment already uploaded to provider storage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentManifestEntry {
    pub media_url: String,
    pub filename: String,
    pub inline: bool,
}
