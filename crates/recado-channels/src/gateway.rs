use std::time::Duration;

use async_trait::async_trait;
use recado_core::config::SenderConfig;
use serde::Serialize;
use tracing::debug;

use crate::{error::ChannelError, sender::MessageSender};

/// JSON payload POSTed to the gateway's `/messages` endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    pub to: &'a str,
    pub text: &'a str,
    /// Wall-clock slot the message was scheduled for, `HH:MM`.
    pub scheduled_for: String,
}

/// HTTP message gateway client.
///
/// Posts one JSON request per send and treats any non-success status as a
/// delivery failure, carrying the gateway's status line and response body as
/// the reason string.
pub struct GatewaySender {
    client: reqwest::Client,
    url: String,
    access_token: Option<String>,
}

impl GatewaySender {
    pub fn from_config(cfg: &SenderConfig) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ChannelError::ConfigError(e.to_string()))?;
        Ok(Self {
            client,
            url: cfg.url.trim_end_matches('/').to_string(),
            access_token: cfg.access_token.clone(),
        })
    }
}

#[async_trait]
impl MessageSender for GatewaySender {
    async fn send(
        &self,
        recipient: &str,
        body: &str,
        hour: u32,
        minute: u32,
    ) -> Result<(), ChannelError> {
        let payload = SendRequest {
            to: recipient,
            text: body,
            scheduled_for: format!("{hour:02}:{minute:02}"),
        };

        let mut req = self
            .client
            .post(format!("{}/messages", self.url))
            .json(&payload);
        if let Some(token) = &self.access_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed(format!(
                "gateway returned {status}: {detail}"
            )));
        }

        debug!(recipient = %recipient, "gateway accepted message");
        Ok(())
    }
}
