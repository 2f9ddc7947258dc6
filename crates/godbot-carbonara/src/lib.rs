//! Carbonara adapter (code screenshots).
//!
//! Implements the `godbot-core` render port over the carbonara `/api/cook`
//! endpoint, which returns an encoded PNG.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use godbot_core::{errors::Error, render::RenderPort, Result};

#[derive(Clone, Debug)]
pub struct CarbonaraClient {
    base_url: String,
    http: reqwest::Client,
}

impl CarbonaraClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CookPayload<'a> {
    code: &'a str,
    theme: &'a str,
    language: &'a str,
    padding_vertical: &'a str,
    padding_horizontal: &'a str,
}

impl<'a> CookPayload<'a> {
    fn new(code: &'a str) -> Self {
        Self {
            code,
            theme: "one-dark",
            language: "text/x-c++src",
            padding_vertical: "10px",
            padding_horizontal: "10px",
        }
    }
}

#[async_trait]
impl RenderPort for CarbonaraClient {
    async fn render_code(&self, code: &str) -> Result<Vec<u8>> {
        let url = format!("{}/api/cook", self.base_url);
        debug!(bytes = code.len(), "rendering code to image");

        let resp = self
            .http
            .post(&url)
            .json(&CookPayload::new(code))
            .send()
            .await
            .map_err(|e| Error::External(format!("carbonara request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::External(format!(
                "carbonara render failed: {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::External(format!("carbonara body error: {e}")))?;
        Ok(bytes.to_vec())
    }
}
