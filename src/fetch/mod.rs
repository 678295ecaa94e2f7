//! Loading raw resource bytes from HTTP or the local filesystem.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::TrafficError;

/// Issues a GET for `url` and returns the body.
///
/// # Errors
///
/// Fails on an invalid URL, a transport error, or a non-success status.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(TrafficError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    Ok(resp.bytes().await?.to_vec())
}

/// Reads `source` from the network when it looks like a URL, otherwise from disk.
#[tracing::instrument(skip_all, fields(source = %source))]
pub async fn load_source<C: HttpClient + ?Sized>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        fetch_bytes(client, source).await?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}
