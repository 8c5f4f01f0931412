//! Publishing a generated React application to CodeSandbox.
//!
//! This is not part of the analysis pipeline: it takes one component's source
//! and returns links to a hosted, runnable copy.

use crate::config::PublishConfig;
use crate::contract::{BoxError, PreviewLink, SandboxPublisher};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <script src="https://cdn.tailwindcss.com"></script>
    <title>Preview</title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

const INDEX_JS: &str = r#"import React from "react";
import { createRoot } from "react-dom/client";
import App from "./App";

createRoot(document.getElementById("root")).render(<App />);
"#;

pub struct CodeSandboxClient {
    client: Client,
    api_base: String,
}

#[derive(Deserialize)]
struct DefineResponse {
    sandbox_id: String,
}

/// The `files` payload of a sandbox whose `src/App.js` is `code`.
pub fn sandbox_files(code: &str) -> serde_json::Value {
    let package = json!({
        "name": "generated-app",
        "version": "1.0.0",
        "main": "src/index.js",
        "dependencies": {
            "react": "^18.2.0",
            "react-dom": "^18.2.0",
            "react-icons": "^5.0.0",
            "react-scripts": "5.0.1"
        }
    });
    json!({
        "package.json": { "content": package },
        "public/index.html": { "content": INDEX_HTML },
        "src/index.js": { "content": INDEX_JS },
        "src/App.js": { "content": code },
    })
}

impl PreviewLink {
    pub fn for_sandbox(sandbox_id: impl Into<String>) -> Self {
        let sandbox_id = sandbox_id.into();
        Self {
            preview_url: format!("https://{sandbox_id}.csb.app"),
            editor_url: format!("https://codesandbox.io/s/{sandbox_id}"),
            sandbox_id,
        }
    }
}

impl CodeSandboxClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, BoxError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PublishConfig) -> Result<Self, BoxError> {
        Self::new(config.api_base.clone(), Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl SandboxPublisher for CodeSandboxClient {
    async fn publish(&self, code: &str) -> Result<PreviewLink, BoxError> {
        if code.trim().is_empty() {
            return Err("refusing to publish empty application code".into());
        }
        let url = format!("{}/api/v1/sandboxes/define?json=1", self.api_base);
        info!(url = %url, code_len = code.len(), "Publishing sandbox");

        let resp = self
            .client
            .post(&url)
            .json(&json!({ "files": sandbox_files(code) }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            error!(status = %status, url = %url, "Sandbox API returned error. Response body: {text}");
            return Err(format!("sandbox API returned {status}: {text}").into());
        }

        let define: DefineResponse = resp.json().await?;
        let link = PreviewLink::for_sandbox(define.sandbox_id);
        info!(preview = %link.preview_url, "Sandbox published");
        Ok(link)
    }
}

/// Read an application component from `path` and publish it.
pub async fn publish_file<P>(publisher: &P, path: &std::path::Path) -> anyhow::Result<PreviewLink>
where
    P: SandboxPublisher + ?Sized,
{
    let code = std::fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read application source");
        anyhow::anyhow!("Failed to read {}: {e}", path.display())
    })?;
    publisher
        .publish(&code)
        .await
        .map_err(|e| anyhow::anyhow!("Publish failed: {e}"))
}
