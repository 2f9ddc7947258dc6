//! Compiler Explorer adapter (HTTP).
//!
//! Implements the `godbot-core` explorer port over the public godbolt.org
//! API: compiler list, compile calls, and short-link lookups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use godbot_core::{
    errors::Error,
    explorer::{
        port::ExplorerPort,
        types::{CompileRequest, CompilerListing},
    },
    result::CompileResult,
    Result,
};

/// Libraries made available to every compile, matching the bot's fixed set.
const DEFAULT_LIBRARIES: [(&str, &str); 3] =
    [("boost", "181"), ("fmt", "trunk"), ("rangesv3", "trunk")];

#[derive(Clone, Debug)]
pub struct ExplorerClient {
    base_url: String,
    language: String,
    http: reqwest::Client,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompilePayload<'a> {
    source: &'a str,
    options: PayloadOptions<'a>,
    lang: &'a str,
    bypass_cache: bool,
    allow_store_code_debug: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayloadOptions<'a> {
    user_arguments: &'a str,
    compiler_options: serde_json::Value,
    filters: PayloadFilters,
    tools: Vec<serde_json::Value>,
    libraries: Vec<PayloadLibrary>,
}

#[derive(Debug, Serialize)]
struct PayloadFilters {
    intel: bool,
}

#[derive(Debug, Serialize)]
struct PayloadLibrary {
    id: String,
    version: String,
}

impl<'a> CompilePayload<'a> {
    fn new(req: &'a CompileRequest, language: &'a str) -> Self {
        Self {
            source: &req.source,
            options: PayloadOptions {
                user_arguments: &req.user_arguments,
                compiler_options: serde_json::json!({}),
                filters: PayloadFilters { intel: false },
                tools: Vec::new(),
                libraries: DEFAULT_LIBRARIES
                    .iter()
                    .map(|(id, version)| PayloadLibrary {
                        id: (*id).to_string(),
                        version: (*version).to_string(),
                    })
                    .collect(),
            },
            lang: language,
            bypass_cache: false,
            allow_store_code_debug: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompileResponse {
    code: i64,
    #[serde(default)]
    asm: Vec<OutputLine>,
    #[serde(default)]
    stderr: Vec<OutputLine>,
}

#[derive(Debug, Deserialize)]
struct OutputLine {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ShortlinkInfo {
    #[serde(default)]
    sessions: Vec<ShortlinkSession>,
}

#[derive(Debug, Deserialize)]
struct ShortlinkSession {
    #[serde(default)]
    source: String,
}

fn line_texts(lines: Vec<OutputLine>) -> Vec<String> {
    lines.into_iter().map(|l| l.text).collect()
}

#[async_trait]
impl ExplorerPort for ExplorerClient {
    async fn list_compilers(&self, language: &str) -> Result<Vec<CompilerListing>> {
        let url = self.url(&format!("/api/compilers/{language}"));
        debug!(%url, "fetching compiler list");

        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::External(format!("explorer request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::External(format!(
                "compiler list failed: {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::External(format!("explorer json error: {e}")))
    }

    async fn compile(&self, req: &CompileRequest) -> Result<CompileResult> {
        let url = self.url(&format!("/api/compiler/{}/compile", req.compiler_id));
        debug!(compiler = %req.compiler_id, args = %req.user_arguments, "compiling");

        let payload = CompilePayload::new(req, &self.language);
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::External(format!("explorer request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::External(format!(
                "compile failed: {}",
                resp.status()
            )));
        }

        let body: CompileResponse = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("explorer json error: {e}")))?;

        let ok = body.code == 0;
        let header = format!(
            "{} {} {}",
            req.compiler_id,
            req.user_arguments,
            if ok { "✅" } else { "❌" }
        );

        Ok(CompileResult {
            ok,
            header,
            asm: line_texts(body.asm),
            output: line_texts(body.stderr),
        })
    }

    async fn shortlink_source(&self, link_id: &str) -> Result<String> {
        let url = self.url(&format!("/api/shortlinkinfo/{link_id}"));
        debug!(%url, "resolving short link");

        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::External(format!("explorer request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::External(format!(
                "short link lookup failed: {}",
                resp.status()
            )));
        }

        let info: ShortlinkInfo = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("explorer json error: {e}")))?;

        info.sessions
            .into_iter()
            .next()
            .map(|s| s.source)
            .ok_or_else(|| Error::External(format!("short link {link_id} has no sessions")))
    }
}
