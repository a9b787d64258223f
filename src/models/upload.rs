use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request body for `POST .../presigned-upload`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUploadRequest<'a> {
    pub content_type: &'a str,
}

/// Response of `POST .../presigned-upload`: where and how to upload one file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUploadDescriptor {
    pub media_url: String,
    pub upload_url: String,
    pub upload_method: String,
    #[serde(rename = "uploadFormData")]
    pub upload_form_fields: UploadFormData,
}

/// Form fields that must accompany the file in the storage POST
/// (`Content-Type`, `key`, `policy`, `x-amz-*` signing fields, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct UploadFormData(BTreeMap<String, String>);

impl UploadFormData {
    pub const CONTENT_TYPE: &'static str = "Content-Type";

    /// Content type storage expects for the file part
    pub fn content_type(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(Self::CONTENT_TYPE))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UploadFormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Raw outcome of the storage upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub status: u16,
    pub body: String,
}

impl UploadResult {
    /// Storage answers a successful form upload with an empty 2xx (normally 204).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.body.is_empty()
    }
}

/// Raw outcome of `POST .../messages`; the transport decides what it means
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    pub status: u16,
    pub body: String,
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
