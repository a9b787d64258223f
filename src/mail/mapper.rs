//! Pure translation of an [`OutgoingEmail`] into the provider payload fragments.

use crate::error::{MailError, Result};
use crate::models::{
    Address, BodyBlock, Contact, EmailFrom, Metadata, MetadataHeaders, OutgoingEmail,
};

/// One contact per `to` address, in order
pub fn map_receivers(to: &[Address]) -> Vec<Contact> {
    to.iter()
        .map(|address| Contact::email(address.address.clone()))
        .collect()
}

/// HTML wins over text when both are present.
pub fn map_body(email: &OutgoingEmail) -> Result<BodyBlock> {
    if let Some(html) = &email.html_body {
        return Ok(BodyBlock::html(html.clone()));
    }

    if let Some(text) = &email.text_body {
        return Ok(BodyBlock::text(text.clone()));
    }

    Err(MailError::EmptyBody)
}

pub fn map_metadata(email: &OutgoingEmail) -> Metadata {
    let subject = (!email.subject.is_empty()).then(|| email.subject.clone());

    let headers = email.reply_to.first().map(|reply_to| MetadataHeaders {
        reply_to: reply_to.address.clone(),
    });

    let email_from = email.from.as_ref().map(|from| EmailFrom {
        display_name: from.name.clone().unwrap_or_default(),
        username: from.address.clone(),
    });

    Metadata {
        subject,
        headers,
        email_from,
    }
}
