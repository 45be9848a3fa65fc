//! Marketplace adapter reached through an external helper process.
//!
//! Contract: the helper receives one JSON request on stdin,
//! `{"styleId": "<identifier>"}`, and prints one JSON response on stdout:
//!
//! ```text
//! {"success": true, "data": {"lowestPrice": 210.0, "link": "...", "productId": "..."}}
//! {"success": false, "message": "product not found"}
//! ```
//!
//! A helper that exits non-zero may print the failure object on stderr
//! instead. The helper is killed if it outlives the configured timeout.

use std::process::Stdio;

use async_trait::async_trait;
use kickscout_core::{KicksError, PriceData, Result, SourceKind, SourceResult, SourceSnapshot};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{BridgeConfig, PriceSource};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest<'a> {
    pub style_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<BridgeData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeData {
    #[serde(default)]
    pub lowest_price: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub product_id: Option<serde_json::Value>,
}

impl BridgeResponse {
    pub fn into_snapshot(self) -> SourceSnapshot {
        if !self.success {
            return SourceSnapshot::unavailable(
                self.message.unwrap_or_else(|| "GOAT search failed".to_string()),
            );
        }

        match self.data {
            Some(data) if data.lowest_price.is_some_and(|p| p > 0.0) => {
                debug!("GOAT product {:?}", data.product_id);
                SourceSnapshot::Available(PriceData {
                    lowest_price: data.lowest_price,
                    link: data.link,
                    ..PriceData::default()
                })
            }
            _ => SourceSnapshot::unavailable("No GOAT price found for this SKU"),
        }
    }
}

/// Pull the last JSON object line out of helper output.
fn parse_output(output: &str) -> Option<BridgeResponse> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str(line).ok())
}

#[derive(Debug, Clone)]
pub struct GoatBridge {
    config: BridgeConfig,
}

impl GoatBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    async fn run(&self, identifier: &str) -> Result<BridgeResponse> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                KicksError::Bridge(format!("cannot start {}: {}", self.config.program.display(), e))
            })?;

        let request = serde_json::to_vec(&BridgeRequest { style_id: identifier })?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&request).await {
                // helpers that ignore stdin may close it early
                debug!("Bridge stdin closed: {}", e);
            }
        }

        let output = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| KicksError::Bridge(format!("timed out after {:?}", self.config.timeout)))??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            if let Some(response) = parse_output(&stdout) {
                return Ok(response);
            }
            return Err(KicksError::Bridge(format!("unreadable response: {}", stdout.trim())));
        }

        if let Some(response) = parse_output(&stderr).or_else(|| parse_output(&stdout)) {
            return Ok(response);
        }
        Err(KicksError::Bridge(format!(
            "GOAT search failed ({}): {}",
            output.status,
            stderr.trim()
        )))
    }
}

#[async_trait]
impl PriceSource for GoatBridge {
    fn kind(&self) -> SourceKind {
        SourceKind::Marketplace
    }

    async fn fetch(&self, identifier: &str) -> Result<SourceResult> {
        let response = self.run(identifier).await?;
        let snapshot = response.into_snapshot();
        if let Some(reason) = snapshot.reason() {
            warn!("GOAT returned no price for {}: {}", identifier, reason);
        }
        Ok(SourceResult::snapshot(snapshot))
    }
}
