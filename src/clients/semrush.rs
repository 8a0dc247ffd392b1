use std::collections::HashMap;

use anyhow::Result;
use tracing::warn;

const API_URL: &str = "https://api.semrush.com/";

/// KPI set for one domain. Values are kept as the API's strings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SemrushResult {
    pub authority_score: Option<String>,
    pub organic_traffic: Option<String>,
    pub organic_keywords: Option<String>,
    pub backlinks: Option<String>,
    pub paid_traffic: Option<String>,
}

pub const HEADERS: [&str; 6] = [
    "domain",
    "sem_authority_score",
    "sem_organic_traffic",
    "sem_organic_keywords",
    "sem_backlinks",
    "paid_traffic_est",
];

impl SemrushResult {
    pub fn to_record(&self, domain: &str) -> Vec<String> {
        vec![
            domain.to_string(),
            self.authority_score.clone().unwrap_or_default(),
            self.organic_traffic.clone().unwrap_or_default(),
            self.organic_keywords.clone().unwrap_or_default(),
            self.backlinks.clone().unwrap_or_default(),
            self.paid_traffic.clone().unwrap_or_default(),
        ]
    }
}

pub struct SemrushClient {
    client: reqwest::Client,
    api_key: String,
}

impl SemrushClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Collect the three reports for a domain. Each call degrades independently
    /// to absent values with a logged warning.
    pub async fn lookup(&self, domain: &str) -> SemrushResult {
        let ranks = self
            .report(&[
                ("type", "domain_ranks"),
                ("domain", domain),
                ("export", "api"),
                ("display_limit", "1"),
            ])
            .await
            .unwrap_or_else(|e| {
                warn!("SEMrush domain_ranks failed for {}: {}", domain, e);
                HashMap::new()
            });

        let backlinks = self
            .report(&[
                ("type", "backlinks_overview"),
                ("target", domain),
                ("target_type", "root_domain"),
                ("export", "api"),
            ])
            .await
            .unwrap_or_else(|e| {
                warn!("SEMrush backlinks_overview failed for {}: {}", domain, e);
                HashMap::new()
            });

        let adwords = self
            .report(&[
                ("type", "domain_adwords"),
                ("domain", domain),
                ("export", "api"),
                ("display_limit", "1"),
            ])
            .await
            .unwrap_or_else(|e| {
                warn!("SEMrush domain_adwords failed for {}: {}", domain, e);
                HashMap::new()
            });

        SemrushResult {
            authority_score: ranks.get("Authority Score").cloned(),
            organic_traffic: ranks.get("Organic Traffic").cloned(),
            organic_keywords: ranks.get("Organic Keywords").cloned(),
            backlinks: backlinks.get("Backlinks").cloned(),
            paid_traffic: adwords.get("Paid Traffic").cloned(),
        }
    }

    async fn report(&self, params: &[(&str, &str)]) -> Result<HashMap<String, String>> {
        let text = self
            .client
            .get(API_URL)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_report(&text))
    }
}

/// Parse a semicolon-delimited SEMrush export: one header line, one value line.
/// `ERROR …` bodies and truncated responses yield an empty map.
pub fn parse_report(text: &str) -> HashMap<String, String> {
    let mut lines = text.trim().lines();
    let (Some(header), Some(values)) = (lines.next(), lines.next()) else {
        return HashMap::new();
    };
    if header.starts_with("ERROR") {
        return HashMap::new();
    }
    header
        .split(';')
        .zip(values.split(';'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

// ── Tests ──
