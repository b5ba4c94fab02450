use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::ArchiveSource;
use anyhow::{Result, bail};

/// Archive downloaded in full from an HTTP(S) URL
pub struct HttpSource {
    url: String,
    timeout: Duration,
    max_retry: u32,
}

impl HttpSource {
    pub fn new(url: String) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(30),
            max_retry: 10,
        }
    }

    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }
}

#[async_trait]
impl ArchiveSource for HttpSource {
    async fn load(&self) -> Result<Vec<u8>> {
        let client = Client::builder().timeout(self.timeout).build()?;
        let mut retry_count = 0;

        loop {
            match client.get(&self.url).send().await {
                Ok(resp) => {
                    if resp.status() != StatusCode::OK {
                        bail!("HTTP request failed with status: {}", resp.status());
                    }
                    return Ok(resp.bytes().await?.to_vec());
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded: {}", e);
                    }
                    tracing::warn!(
                        "Connection error, retry {}/{}: {}",
                        retry_count,
                        self.max_retry,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
