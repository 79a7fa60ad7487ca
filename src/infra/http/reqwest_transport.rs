use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header;
use reqwest::Client;
use tracing::debug;

use crate::usecase::ports::api::{ApiError, ApiRequest, RawResponse, Transport};

/// Session cookie value that never shows up in `Debug` output.
#[derive(Clone)]
struct SessionCookie(String);

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCookie([REDACTED])")
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    session: Option<SessionCookie>,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, session_cookie: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("salesdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: session_cookie
                .filter(|cookie| !cookie.trim().is_empty())
                .map(SessionCookie),
        })
    }

    pub fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base_url, request.path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let mut builder = self
            .client
            .get(self.url_for(request))
            .query(&request.query)
            .header(header::ACCEPT, "application/json");
        if let Some(session) = &self.session {
            builder = builder.header(header::COOKIE, session.0.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::network(Some(&err.to_string())))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::network(Some(&err.to_string())))?;
        debug!(path = request.path, status = status.as_u16(), "response received");

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}
