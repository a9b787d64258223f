use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bird_mail_transport::config::BirdConfig;
use bird_mail_transport::mail::Mailer;
use bird_mail_transport::models::{Address, Attachment, OutgoingEmail};

/// Send a single email through the Bird channels API.
#[derive(Debug, Parser)]
#[command(name = "bird-mail", version)]
struct Args {
    /// Recipient address (repeatable)
    #[arg(long, required = true)]
    to: Vec<String>,

    /// Sender address
    #[arg(long)]
    from: Option<String>,

    /// Sender display name
    #[arg(long, requires = "from")]
    from_name: Option<String>,

    #[arg(long)]
    reply_to: Option<String>,

    #[arg(long, default_value = "")]
    subject: String,

    /// Plain text body
    #[arg(long)]
    text: Option<String>,

    /// HTML body (takes precedence over --text)
    #[arg(long)]
    html: Option<String>,

    /// File to attach, optionally with its content type: PATH[:type/subtype]
    #[arg(long)]
    attach: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = BirdConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        workspace_id = %config.workspace_id,
        channel_id = %config.channel_id,
        "Configuration loaded"
    );

    let mailer = Mailer::new(&config)?;
    let email = build_email(args).await?;

    mailer.send(email).await?;
    tracing::info!(transport = %mailer.transport(), "Done");

    Ok(())
}

async fn build_email(args: Args) -> anyhow::Result<OutgoingEmail> {
    let mut builder = OutgoingEmail::builder().subject(args.subject);

    for to in args.to {
        builder = builder.to(Address::new(to));
    }

    if let Some(from) = args.from {
        builder = builder.from(match args.from_name {
            Some(name) => Address::with_name(from, name),
            None => Address::new(from),
        });
    }

    if let Some(reply_to) = args.reply_to {
        builder = builder.reply_to(Address::new(reply_to));
    }

    if let Some(html) = args.html {
        builder = builder.html(html);
    }

    if let Some(text) = args.text {
        builder = builder.text(text);
    }

    for arg in &args.attach {
        builder = builder.attach(load_attachment(arg).await?);
    }

    Ok(builder.build()?)
}

/// `PATH[:type/subtype]`; without a content type the file goes out as
/// `application/octet-stream`.
async fn load_attachment(arg: &str) -> anyhow::Result<Attachment> {
    let (path, content_type) = match arg.rsplit_once(':') {
        Some((path, content_type)) if content_type.contains('/') => {
            (PathBuf::from(path), content_type)
        }
        _ => (PathBuf::from(arg), "application/octet-stream"),
    };

    let body = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read attachment {}", path.display()))?;

    Ok(Attachment::new(body, &file_name(&path)?, content_type))
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Attachment path has no file name: {}", path.display()))
}
