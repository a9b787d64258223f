pub mod config;
pub mod error;
pub mod mail;
pub mod models;

pub use config::{AttachmentFailurePolicy, BirdConfig};
pub use error::{MailError, Result};
pub use mail::{BirdTransport, MailTransport, Mailer};
