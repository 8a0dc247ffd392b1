use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::warn;

const SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const PHOTO_URL: &str = "https://maps.googleapis.com/maps/api/place/photo";
const MAX_REVIEWS: usize = 5;

/// Place data for one business. All fields absent on no-match or API failure.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapsResult {
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    /// Rating as reported by the details endpoint; can drift from the search one.
    pub details_rating: Option<f64>,
    pub concatenated_reviews: Option<String>,
}

pub struct MapsClient {
    client: reqwest::Client,
    api_key: String,
}

impl MapsClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Look up a business by domain (plus region, when present).
    ///
    /// Never fails the caller: no match, non-200 and decode errors all degrade
    /// to the all-absent result with a logged warning.
    pub async fn lookup(&self, domain: &str, region: &str) -> MapsResult {
        let query = if region.is_empty() {
            domain.to_string()
        } else {
            format!("{} {}", domain, region)
        };

        let (place_id, mut result) = match self.search(&query).await {
            Ok(Some(hit)) => hit,
            Ok(None) => {
                warn!("No Maps match for {}", domain);
                return MapsResult::default();
            }
            Err(e) => {
                warn!("Maps search failed for {}: {}", domain, e);
                return MapsResult::default();
            }
        };

        if let Some(id) = place_id {
            match self.details(&id).await {
                Ok((rating, reviews)) => {
                    result.details_rating = rating;
                    result.concatenated_reviews = reviews;
                }
                Err(e) => warn!("Maps details failed for {}: {}", domain, e),
            }
        }

        result
    }

    async fn search(&self, query: &str) -> Result<Option<(Option<String>, MapsResult)>> {
        let body: Value = self
            .client
            .get(SEARCH_URL)
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match body.get("status").and_then(|s| s.as_str()) {
            Some("OK") => {}
            Some("ZERO_RESULTS") => return Ok(None),
            Some(other) => return Err(anyhow!("Places API status {}", other)),
            None => return Err(anyhow!("Places API response missing status")),
        }

        Ok(parse_search(&body))
    }

    async fn details(&self, place_id: &str) -> Result<(Option<f64>, Option<String>)> {
        let body: Value = self
            .client
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", "rating,reviews"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.get("status").and_then(|s| s.as_str()) != Some("OK") {
            return Err(anyhow!(
                "Places details status {}",
                body.get("status").and_then(|s| s.as_str()).unwrap_or("?")
            ));
        }

        Ok(parse_details(&body))
    }
}

/// Extract the first search candidate, if any.
fn parse_search(body: &Value) -> Option<(Option<String>, MapsResult)> {
    let first = body.get("results").and_then(|r| r.as_array())?.first()?;

    let place_id = first
        .get("place_id")
        .and_then(|p| p.as_str())
        .map(str::to_string);

    let location = first.get("geometry").and_then(|g| g.get("location"));
    let photo_url = first
        .get("photos")
        .and_then(|p| p.as_array())
        .and_then(|p| p.first())
        .and_then(|p| p.get("photo_reference"))
        .and_then(|r| r.as_str())
        .map(|r| format!("{}?maxwidth=400&photo_reference={}", PHOTO_URL, r));

    let result = MapsResult {
        rating: first.get("rating").and_then(|v| v.as_f64()),
        review_count: first.get("user_ratings_total").and_then(|v| v.as_i64()),
        title: first.get("name").and_then(|v| v.as_str()).map(str::to_string),
        category: first
            .get("types")
            .and_then(|t| t.as_array())
            .and_then(|t| t.first())
            .and_then(|t| t.as_str())
            .map(str::to_string),
        latitude: location.and_then(|l| l.get("lat")).and_then(|v| v.as_f64()),
        longitude: location.and_then(|l| l.get("lng")).and_then(|v| v.as_f64()),
        photo_url,
        details_rating: None,
        concatenated_reviews: None,
    };

    Some((place_id, result))
}

/// Extract rating and joined review texts from a details response.
fn parse_details(body: &Value) -> (Option<f64>, Option<String>) {
    let result = body.get("result");

    let rating = result
        .and_then(|r| r.get("rating"))
        .and_then(|v| v.as_f64());

    let texts: Vec<&str> = result
        .and_then(|r| r.get("reviews"))
        .and_then(|r| r.as_array())
        .map(|reviews| {
            reviews
                .iter()
                .take(MAX_REVIEWS)
                .filter_map(|r| r.get("text").and_then(|t| t.as_str()))
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let concatenated = if texts.is_empty() {
        None
    } else {
        Some(texts.join(" | "))
    };

    (rating, concatenated)
}

// ── Tests ──
