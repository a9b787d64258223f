use bytes::Bytes;
use percent_encoding::percent_decode_str;

use crate::error::{MailError, Result};

/// A mailbox: address plus optional display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub address: String,
    pub name: Option<String>,
}

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    pub fn with_name(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: Some(name.into()),
        }
    }
}

/// A file attached to an outgoing email.
///
/// The filename is not stored on its own: like a MIME part, it lives in the
/// `Content-Disposition` header and is read back from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub body: Bytes,
    pub media_type: String,
    pub media_subtype: String,
    pub content_disposition: Option<String>,
}

impl Attachment {
    /// Build an attachment from a filename and a `type/subtype` content type.
    ///
    /// A content type without a slash is treated as `application/octet-stream`.
    pub fn new(body: impl Into<Bytes>, filename: &str, content_type: &str) -> Self {
        let (media_type, media_subtype) = content_type
            .split_once('/')
            .unwrap_or(("application", "octet-stream"));

        Self::from_parts(
            body,
            media_type,
            media_subtype,
            Some(format!(
                "attachment; filename=\"{}\"",
                filename.replace('\\', "\\\\").replace('"', "\\\"")
            )),
        )
    }

    /// Build an attachment from raw MIME parts, e.g. when relaying an already parsed message.
    pub fn from_parts(
        body: impl Into<Bytes>,
        media_type: impl Into<String>,
        media_subtype: impl Into<String>,
        content_disposition: Option<String>,
    ) -> Self {
        Self {
            body: body.into(),
            media_type: media_type.into(),
            media_subtype: media_subtype.into(),
            content_disposition,
        }
    }

    pub fn content_type(&self) -> String {
        format!("{}/{}", self.media_type, self.media_subtype)
    }

    /// First `filename` parameter of the `Content-Disposition` header, if any.
    ///
    /// Falls back to an RFC 2231 `filename*` parameter when no plain one is set.
    /// Split `filename*0*` continuations are not supported.
    pub fn filename(&self) -> Option<String> {
        let header = self.content_disposition.as_deref()?;

        header_parameter(header, "filename").or_else(|| {
            header_parameter(header, "filename*").and_then(|value| decode_extended_value(&value))
        })
    }
}

/// Look up a parameter of a structured header value such as
/// `attachment; filename="report.pdf"`. Names compare case-insensitively.
fn header_parameter(header: &str, name: &str) -> Option<String> {
    // Skip the disposition type itself.
    let mut rest = &header[header.find(';')? + 1..];

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            return None;
        }

        // A parameter without a value ends at the next `;`.
        let segment_end = rest.find(';').unwrap_or(rest.len());
        let Some(eq) = rest[..segment_end].find('=') else {
            rest = &rest[segment_end..];
            continue;
        };
        let key = rest[..eq].trim();
        rest = rest[eq + 1..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let mut value = String::new();
            let mut chars = quoted.char_indices();
            let mut end = quoted.len();
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => {
                        end = i + 1;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            rest = &quoted[end..];
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let value = rest[..end].trim().to_string();
            rest = &rest[end..];
            value
        };

        if key.eq_ignore_ascii_case(name) {
            return Some(value);
        }
    }
}

/// Decode an RFC 2231 extended value: `charset'language'percent-encoded`.
fn decode_extended_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let (charset, encoded) = match (parts.next(), parts.next(), parts.next()) {
        (Some(charset), Some(_language), Some(encoded)) => (charset, encoded),
        _ => ("utf-8", value),
    };

    let decoded = percent_decode_str(encoded);
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "" => decoded.decode_utf8().ok().map(|s| s.into_owned()),
        "iso-8859-1" | "latin1" | "us-ascii" => Some(decoded.map(char::from).collect()),
        _ => None,
    }
}

/// Email handed to the transport. Immutable once built.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: Option<Address>,
    pub to: Vec<Address>,
    pub reply_to: Vec<Address>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl OutgoingEmail {
    pub fn builder() -> OutgoingEmailBuilder {
        OutgoingEmailBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct OutgoingEmailBuilder {
    from: Option<Address>,
    to: Vec<Address>,
    reply_to: Vec<Address>,
    subject: String,
    html_body: Option<String>,
    text_body: Option<String>,
    attachments: Vec<Attachment>,
}

impl OutgoingEmailBuilder {
    pub fn from(mut self, address: Address) -> Self {
        self.from = Some(address);
        self
    }

    pub fn to(mut self, address: Address) -> Self {
        self.to.push(address);
        self
    }

    pub fn reply_to(mut self, address: Address) -> Self {
        self.reply_to.push(address);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text_body = Some(text.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Only recipients are validated here; a missing body is reported when
    /// the transport maps the message.
    pub fn build(self) -> Result<OutgoingEmail> {
        if self.to.is_empty() {
            return Err(MailError::InvalidMessage(
                "at least one recipient required".to_string(),
            ));
        }

        Ok(OutgoingEmail {
            from: self.from,
            to: self.to,
            reply_to: self.reply_to,
            subject: self.subject,
            html_body: self.html_body,
            text_body: self.text_body,
            attachments: self.attachments,
        })
    }
}

/// Message as handed over by the dispatch pipeline.
#[derive(Debug, Clone)]
pub struct SentMessage {
    original: OutgoingEmail,
}

impl SentMessage {
    pub fn new(email: OutgoingEmail) -> Self {
        Self { original: email }
    }

    pub fn email(&self) -> &OutgoingEmail {
        &self.original
    }
}

impl From<OutgoingEmail> for SentMessage {
    fn from(email: OutgoingEmail) -> Self {
        Self::new(email)
    }
}
