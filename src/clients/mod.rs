pub mod maps;
pub mod pagespeed;
pub mod semrush;

use std::time::Duration;

use anyhow::Result;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared HTTP client for all API calls in a run.
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Fetch a required API key from the environment. Missing key is a setup error.
pub fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable must be set", name))
}
