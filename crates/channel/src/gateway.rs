//! HTTP gateway transport.
//!
//! The gateway is a separate process fronting the real messaging channel
//! (it owns the authenticated session). Courier talks to two endpoints:
//! `POST {base}/send` and `GET {base}/status`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::transport::{ChannelProbe, ChannelTransport};
use crate::ChannelError;

#[derive(Serialize)]
struct SendBody<'a> {
    recipient: &'a str,
    message: &'a str,
}

/// Production [`ChannelTransport`] over an HTTP gateway.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Build a gateway client with a bounded per-request timeout.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        send_timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(send_timeout)
            .build()
            .map_err(|e| ChannelError::Gateway(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn classify_transport_error(err: &reqwest::Error) -> ChannelError {
    if err.is_timeout() {
        ChannelError::Timeout
    } else if err.is_connect() {
        ChannelError::Connect(err.to_string())
    } else {
        ChannelError::Gateway(err.to_string())
    }
}

#[async_trait]
impl ChannelTransport for HttpGateway {
    async fn send_text(&self, recipient: &str, body: &str) -> Result<(), ChannelError> {
        let url = format!("{}/send", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .json(&SendBody { recipient, message: body })
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(ChannelError::Rejected { status: status.as_u16(), detail })
        } else {
            Err(ChannelError::Gateway(format!("{status}: {detail}")))
        }
    }

    async fn probe(&self) -> Result<ChannelProbe, ChannelError> {
        let url = format!("{}/status", self.base_url);
        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Gateway(format!("status probe returned {status}")));
        }
        response
            .json::<ChannelProbe>()
            .await
            .map_err(|e| ChannelError::Gateway(format!("malformed status body: {e}")))
    }
}
