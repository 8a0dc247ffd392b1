use anyhow::Result;
use serde_json::Value;
use tracing::warn;

const PSI_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Device profile for a PageSpeed Insights run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

/// Metrics for one strategy run. Field data is absent for low-traffic sites,
/// which is expected, not an error; lab data is absent only when the whole
/// call failed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageSpeedResult {
    pub field_lcp_ms: Option<f64>,
    pub field_cls: Option<f64>,
    pub field_inp_ms: Option<f64>,
    pub field_fcp_ms: Option<f64>,
    pub lab_lcp_ms: Option<f64>,
    pub lab_cls: Option<f64>,
    pub lab_inp_ms: Option<f64>,
    /// Lab category scores, scaled 0-100.
    pub perf_score: Option<i64>,
    pub accessibility: Option<i64>,
    pub best_practices: Option<i64>,
    pub seo: Option<i64>,
    /// Optimization opportunity savings, kilobytes (rounded).
    pub img_sav_kb: Option<i64>,
    pub js_sav_kb: Option<i64>,
    pub css_sav_kb: Option<i64>,
}

pub struct PageSpeedClient {
    client: reqwest::Client,
    api_key: String,
}

impl PageSpeedClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Audit one URL under one strategy. Degrades to all-absent on any failure;
    /// the two strategy calls are fully independent.
    pub async fn audit(&self, url: &str, strategy: Strategy) -> PageSpeedResult {
        match self.fetch(url, strategy).await {
            Ok(body) => parse_response(&body),
            Err(e) => {
                warn!("PageSpeed {} audit failed for {}: {}", strategy.as_str(), url, e);
                PageSpeedResult::default()
            }
        }
    }

    async fn fetch(&self, url: &str, strategy: Strategy) -> Result<Value> {
        let body = self
            .client
            .get(PSI_URL)
            .query(&[
                ("url", url),
                ("strategy", strategy.as_str()),
                ("category", "performance"),
                ("category", "accessibility"),
                ("category", "best-practices"),
                ("category", "seo"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }
}

/// Flatten a PSI v5 response into the metrics we report.
pub fn parse_response(body: &Value) -> PageSpeedResult {
    PageSpeedResult {
        field_lcp_ms: field_percentile(body, "LARGEST_CONTENTFUL_PAINT_MS"),
        // CrUX reports CLS percentile scaled by 100; undo that here.
        field_cls: field_percentile(body, "CUMULATIVE_LAYOUT_SHIFT_SCORE").map(|v| v / 100.0),
        field_inp_ms: field_percentile(body, "INTERACTION_TO_NEXT_PAINT"),
        field_fcp_ms: field_percentile(body, "FIRST_CONTENTFUL_PAINT_MS"),
        lab_lcp_ms: audit_value(body, "largest-contentful-paint"),
        lab_cls: audit_value(body, "cumulative-layout-shift"),
        lab_inp_ms: audit_value(body, "interaction-to-next-paint")
            .or_else(|| audit_value(body, "experimental-interaction-to-next-paint")),
        perf_score: category_score(body, "performance"),
        accessibility: category_score(body, "accessibility"),
        best_practices: category_score(body, "best-practices"),
        seo: category_score(body, "seo"),
        img_sav_kb: savings_kb(body, &["modern-image-formats", "uses-optimized-images"]),
        js_sav_kb: savings_kb(body, &["unused-javascript"]),
        css_sav_kb: savings_kb(body, &["unused-css-rules"]),
    }
}

fn category_score(body: &Value, name: &str) -> Option<i64> {
    let score = body
        .get("lighthouseResult")?
        .get("categories")?
        .get(name)?
        .get("score")?
        .as_f64()?;
    Some((score * 100.0).round() as i64)
}

fn audit<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.get("lighthouseResult")?.get("audits")?.get(name)
}

fn audit_value(body: &Value, name: &str) -> Option<f64> {
    audit(body, name)?.get("numericValue")?.as_f64()
}

fn field_percentile(body: &Value, metric: &str) -> Option<f64> {
    body.get("loadingExperience")?
        .get("metrics")?
        .get(metric)?
        .get("percentile")?
        .as_f64()
}

/// Sum `overallSavingsBytes` over the named audits, in kilobytes (rounded).
/// Absent when none of the audits report savings.
fn savings_kb(body: &Value, names: &[&str]) -> Option<i64> {
    let bytes: Vec<f64> = names
        .iter()
        .filter_map(|n| {
            audit(body, n)?
                .get("details")?
                .get("overallSavingsBytes")?
                .as_f64()
        })
        .collect();

    if bytes.is_empty() {
        None
    } else {
        Some((bytes.iter().sum::<f64>() / 1024.0).round() as i64)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> Value {
        let raw = std::fs::read_to_string(format!("tests/fixtures/{}.json", name)).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn full_response() {
        let r = parse_response(&fixture("pagespeed_mobile"));
        assert_eq!(r.perf_score, Some(42));
        assert_eq!(r.accessibility, Some(88));
        assert_eq!(r.best_practices, Some(75));
        assert_eq!(r.seo, Some(92));
        assert_eq!(r.field_lcp_ms, Some(3100.0));
        assert_eq!(r.field_fcp_ms, Some(1800.0));
        assert_eq!(r.field_cls, Some(0.12));
        assert_eq!(r.field_inp_ms, Some(225.0));
        assert_eq!(r.lab_lcp_ms, Some(3421.5));
        assert_eq!(r.lab_cls, Some(0.31));
        assert_eq!(r.lab_inp_ms, Some(180.0));
        // 150000 + 80000 bytes -> 225 KB; 210000 -> 205 KB; 52000 -> 51 KB
        assert_eq!(r.img_sav_kb, Some(225));
        assert_eq!(r.js_sav_kb, Some(205));
        assert_eq!(r.css_sav_kb, Some(51));
    }

    #[test]
    fn no_field_data() {
        let r = parse_response(&fixture("pagespeed_nofield"));
        assert_eq!(r.perf_score, Some(96));
        assert_eq!(r.field_lcp_ms, None);
        assert_eq!(r.field_cls, None);
        assert_eq!(r.field_inp_ms, None);
        assert_eq!(r.field_fcp_ms, None);
        // No opportunity audits reported either.
        assert_eq!(r.img_sav_kb, None);
    }

    #[test]
    fn empty_body_is_all_absent() {
        let r = parse_response(&serde_json::json!({}));
        assert_eq!(r, PageSpeedResult::default());
    }
}
