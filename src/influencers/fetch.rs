use std::fs;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads a local path or downloads an `http(s)` URL.
pub fn fetch_bytes(source: &str) -> Result<Vec<u8>> {
    if !is_remote(source) {
        return fs::read(source).with_context(|| format!("failed to read {source}"));
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(source)
        .send()
        .with_context(|| format!("failed to request {source}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("request for {source} failed with status {status}"));
    }

    let body = response
        .bytes()
        .with_context(|| format!("failed to read response body from {source}"))?;
    Ok(body.to_vec())
}
