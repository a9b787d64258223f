pub mod email;
pub mod payload;
pub mod upload;

pub use email::{Address, Attachment, OutgoingEmail, OutgoingEmailBuilder, SentMessage};

pub use payload::{
    AttachmentManifestEntry,
    BodyBlock,
    Contact,
    EmailFrom,
    HtmlContent,
    Metadata,
    MetadataHeaders,
    ProviderPayload,
    Receiver,
    TextContent,
};

pub use upload::{
    PresignedUploadDescriptor,
    PresignedUploadRequest,
    SendResult,
    UploadFormData,
    UploadResult,
};
