// src/fetch/mod.rs

use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::error::{Result, TenderError};

/// Client with the configured request timeout.
pub fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .gzip(true)
        .build()
        .map_err(|e| TenderError::Fetch {
            url: config.feed_url.clone(),
            message: format!("building HTTP client: {}", e),
        })
}

async fn get_text_core(client: &Client, url: &str) -> Result<String> {
    debug!("Fetching text from {}", url);
    let resp = client.get(url).send().await.map_err(|e| TenderError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(TenderError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    resp.text().await.map_err(|e| TenderError::Fetch {
        url: url.to_string(),
        message: format!("reading body: {}", e),
    })
}

/// Client errors won't get better by asking again.
fn is_retryable(err: &TenderError) -> bool {
    match err {
        TenderError::Status { status, .. } => !(400..500).contains(status),
        TenderError::Fetch { .. } => true,
        _ => false,
    }
}

async fn get_text_with_retry(
    client: &Client,
    url: &str,
    max_retries: u32,
    initial_backoff_ms: u64,
) -> Result<String> {
    let mut attempts = 0;
    loop {
        match get_text_core(client, url).await {
            Ok(t) => return Ok(t),
            Err(e) if attempts < max_retries && is_retryable(&e) => {
                attempts += 1;
                let backoff = initial_backoff_ms * 2u64.pow(attempts - 1);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Giving up on feed");
                return Err(e);
            }
        }
    }
}

/// Download the raw tender feed text.
#[instrument(level = "info", skip(client, config), fields(url = %config.feed_url))]
pub async fn fetch_feed(client: &Client, config: &Config) -> Result<String> {
    let text = get_text_with_retry(
        client,
        &config.feed_url,
        config.max_retries,
        config.initial_backoff_ms,
    )
    .await?;
    info!(bytes = text.len(), "feed downloaded");
    Ok(text)
}
