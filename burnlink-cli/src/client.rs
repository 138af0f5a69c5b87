use anyhow::{anyhow, bail, Context, Result};
use reqwest::StatusCode;
use tracing::debug;
use zeroize::Zeroizing;

/// Minimal HTTP client for a burnlink server.
pub struct BurnlinkClient {
    pub base_url: String,
    http: reqwest::Client,
}

impl BurnlinkClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Submit a secret and return its retrieval URL.
    pub async fn store(&self, secret: Vec<u8>) -> Result<String> {
        if secret.is_empty() {
            bail!("Secret cannot be empty");
        }

        let url = format!("{}/store", self.base_url);
        debug!(%url, bytes = secret.len(), "Submitting secret");
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(secret)
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(anyhow!("server rejected secret ({}): {}", status, body.trim()));
        }
        Ok(body.trim().to_string())
    }

    /// Redeem a key, burning the secret on the server.
    pub async fn fetch(&self, key: &str) -> Result<Zeroizing<Vec<u8>>> {
        let url = format!("{}/secret/{}", self.base_url, key);
        debug!(server = %self.base_url, "Redeeming secret");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;

        match resp.status() {
            StatusCode::OK => Ok(Zeroizing::new(resp.bytes().await?.to_vec())),
            StatusCode::NOT_FOUND => bail!("Secret not found or has expired"),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(anyhow!("server error ({}): {}", status, body.trim()))
            }
        }
    }
}

/// Accept either a bare key or a full retrieval link.
pub fn extract_key(input: &str) -> Result<&str> {
    let input = input.trim();
    let key = match input.split_once("/secret/") {
        Some((_, key)) => key,
        None => input,
    };
    let key = key.trim_end_matches('/');
    if key.is_empty() || key.contains('/') {
        bail!("Secret key is required");
    }
    Ok(key)
}
