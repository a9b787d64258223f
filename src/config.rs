use std::env;
use std::str::FromStr;
use std::time::Duration;

/// What to do when a single attachment cannot be presigned or uploaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttachmentFailurePolicy {
    /// Abandon the whole send (default).
    #[default]
    Abort,
    /// Log the failure and send the message without that attachment.
    Skip,
}

impl FromStr for AttachmentFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(ConfigError::InvalidAttachmentPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BirdConfig {
    pub access_key: String,
    pub base_url: String,
    pub workspace_id: String,
    pub channel_id: String,
    pub timeout_seconds: u64,
    pub attachment_policy: AttachmentFailurePolicy,
}

impl BirdConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(BirdConfig {
            access_key: env::var("BIRD_ACCESS_KEY")
                .map_err(|_| ConfigError::Missing("BIRD_ACCESS_KEY"))?,
            base_url: env::var("BIRD_BASE_URL")
                .unwrap_or_else(|_| "https://api.bird.com".to_string()),
            workspace_id: env::var("BIRD_WORKSPACE_ID")
                .map_err(|_| ConfigError::Missing("BIRD_WORKSPACE_ID"))?,
            channel_id: env::var("BIRD_CHANNEL_ID")
                .map_err(|_| ConfigError::Missing("BIRD_CHANNEL_ID"))?,
            timeout_seconds: env::var("BIRD_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout)?,
            attachment_policy: env::var("BIRD_ATTACHMENT_FAILURE_POLICY")
                .map(|v| v.parse::<AttachmentFailurePolicy>())
                .unwrap_or(Ok(AttachmentFailurePolicy::Abort))?,
        })
    }

    /// Channel-scoped root every provider endpoint hangs off.
    pub fn channel_url(&self) -> String {
        format!(
            "{}/workspaces/{}/channels/{}",
            self.base_url.trim_end_matches('/'),
            self.workspace_id,
            self.channel_id
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("BIRD_TIMEOUT_SECONDS must be a whole number of seconds")]
    InvalidTimeout,
    #[error("Unknown attachment failure policy: {0} (expected abort or skip)")]
    InvalidAttachmentPolicy(String),
}
