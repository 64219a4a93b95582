use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// One outbound email, already resolved to a concrete recipient.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Posts messages to an HTTP mail relay as JSON.
pub struct RelayMailer {
    client: reqwest::Client,
    relay_url: String,
    token: Option<String>,
    from: String,
}

impl RelayMailer {
    pub fn new(relay_url: String, token: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url,
            token,
            from,
        }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.body,
        });

        debug!(to = %message.to, "posting message to mail relay");

        let mut request = self.client.post(&self.relay_url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "mail relay rejected message");
            bail!("mail relay returned status {status}");
        }

        Ok(())
    }
}

/// Stands in when no relay is configured; Email sends fail loudly instead
/// of dropping mail on the floor.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<()> {
        bail!("mail relay not configured")
    }
}
