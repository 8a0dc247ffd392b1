use crate::classify;
use crate::clients::maps::MapsResult;
use crate::clients::pagespeed::PageSpeedResult;
use crate::input::{self, SiteRecord};

/// Output schema, fixed order. Every row carries all 39 columns; absent values
/// serialize as empty cells, never as missing columns.
pub const HEADERS: [&str; 39] = [
    "shortname",
    "website",
    "region",
    "rating_google",
    "reviews",
    "field_lcp",
    "field_cls",
    "field_inp",
    "field_fcp",
    "field_speed_problem",
    "field_ux_problem",
    "perf_score",
    "issues",
    "category",
    "accessibility",
    "best_practices",
    "seo",
    "concatenated_reviews",
    "title",
    "mobile",
    "mobile_lcp",
    "mobile_cls",
    "mobile_inp",
    "desktop",
    "desktop_lcp",
    "desktop_cls",
    "desktop_inp",
    "lab_speed_problem",
    "lab_ux_problem",
    "fh_score",
    "rating",
    "img_sav_kb",
    "js_sav_kb",
    "css_sav_kb",
    "photo_url",
    "fh_site",
    "account_tier",
    "latitude",
    "longitude",
];

/// One fully assembled output row. Built once per site, written once.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub shortname: String,
    pub website: String,
    pub region: String,
    pub rating_google: Option<f64>,
    pub reviews: Option<i64>,
    pub field_lcp: Option<f64>,
    pub field_cls: Option<f64>,
    pub field_inp: Option<f64>,
    pub field_fcp: Option<f64>,
    pub field_speed_problem: Option<bool>,
    pub field_ux_problem: Option<bool>,
    pub perf_score: Option<i64>,
    pub issues: Option<String>,
    pub category: Option<String>,
    pub accessibility: Option<i64>,
    pub best_practices: Option<i64>,
    pub seo: Option<i64>,
    pub concatenated_reviews: Option<String>,
    pub title: Option<String>,
    pub mobile: Option<i64>,
    pub mobile_lcp: Option<f64>,
    pub mobile_cls: Option<f64>,
    pub mobile_inp: Option<f64>,
    pub desktop: Option<i64>,
    pub desktop_lcp: Option<f64>,
    pub desktop_cls: Option<f64>,
    pub desktop_inp: Option<f64>,
    pub lab_speed_problem: Option<bool>,
    pub lab_ux_problem: Option<bool>,
    pub fh_score: Option<i64>,
    pub rating: Option<f64>,
    pub img_sav_kb: Option<i64>,
    pub js_sav_kb: Option<i64>,
    pub css_sav_kb: Option<i64>,
    pub photo_url: Option<String>,
    pub fh_site: String,
    pub account_tier: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Merge one site's input data with its Maps and PageSpeed results.
///
/// Field data, category scores, savings and all four problem flags come from
/// the mobile run (the headline strategy); the `mobile`/`desktop` column
/// groups carry each strategy's lab performance score and metric values.
pub fn assemble(
    site: &SiteRecord,
    maps: &MapsResult,
    mobile: &PageSpeedResult,
    desktop: &PageSpeedResult,
) -> OutputRow {
    let flags = classify::classify(mobile);
    let host = input::normalize_host(&site.domain);

    OutputRow {
        shortname: input::shortname(&site.domain),
        website: format!("https://{}", host),
        region: site.region.clone(),
        rating_google: maps.rating,
        reviews: maps.review_count,
        field_lcp: mobile.field_lcp_ms,
        field_cls: mobile.field_cls,
        field_inp: mobile.field_inp_ms,
        field_fcp: mobile.field_fcp_ms,
        field_speed_problem: flags.field_speed,
        field_ux_problem: flags.field_ux,
        perf_score: mobile.perf_score,
        issues: classify::issue_summary(mobile),
        category: maps.category.clone(),
        accessibility: mobile.accessibility,
        best_practices: mobile.best_practices,
        seo: mobile.seo,
        concatenated_reviews: maps.concatenated_reviews.clone(),
        title: maps.title.clone(),
        mobile: mobile.perf_score,
        mobile_lcp: mobile.lab_lcp_ms,
        mobile_cls: mobile.lab_cls,
        mobile_inp: mobile.lab_inp_ms,
        desktop: desktop.perf_score,
        desktop_lcp: desktop.lab_lcp_ms,
        desktop_cls: desktop.lab_cls,
        desktop_inp: desktop.lab_inp_ms,
        lab_speed_problem: flags.lab_speed,
        lab_ux_problem: flags.lab_ux,
        fh_score: fh_score(mobile),
        rating: maps.details_rating,
        img_sav_kb: mobile.img_sav_kb,
        js_sav_kb: mobile.js_sav_kb,
        css_sav_kb: mobile.css_sav_kb,
        photo_url: maps.photo_url.clone(),
        fh_site: site.fh_site.clone(),
        account_tier: site.account_tier.clone(),
        latitude: maps.latitude,
        longitude: maps.longitude,
    }
}

/// Composite site-health score: rounded mean of the mobile lab category
/// scores that are present.
fn fh_score(mobile: &PageSpeedResult) -> Option<i64> {
    let scores: Vec<i64> = [
        mobile.perf_score,
        mobile.accessibility,
        mobile.best_practices,
        mobile.seo,
    ]
    .into_iter()
    .flatten()
    .collect();

    if scores.is_empty() {
        None
    } else {
        Some((scores.iter().sum::<i64>() as f64 / scores.len() as f64).round() as i64)
    }
}

impl OutputRow {
    /// Serialize in `HEADERS` order. Millisecond metrics round to whole
    /// milliseconds; everything else keeps its shortest decimal form.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.shortname.clone(),
            self.website.clone(),
            self.region.clone(),
            fmt_f64(self.rating_google),
            fmt_i64(self.reviews),
            fmt_ms(self.field_lcp),
            fmt_f64(self.field_cls),
            fmt_ms(self.field_inp),
            fmt_ms(self.field_fcp),
            fmt_bool(self.field_speed_problem),
            fmt_bool(self.field_ux_problem),
            fmt_i64(self.perf_score),
            self.issues.clone().unwrap_or_default(),
            self.category.clone().unwrap_or_default(),
            fmt_i64(self.accessibility),
            fmt_i64(self.best_practices),
            fmt_i64(self.seo),
            self.concatenated_reviews.clone().unwrap_or_default(),
            self.title.clone().unwrap_or_default(),
            fmt_i64(self.mobile),
            fmt_ms(self.mobile_lcp),
            fmt_f64(self.mobile_cls),
            fmt_ms(self.mobile_inp),
            fmt_i64(self.desktop),
            fmt_ms(self.desktop_lcp),
            fmt_f64(self.desktop_cls),
            fmt_ms(self.desktop_inp),
            fmt_bool(self.lab_speed_problem),
            fmt_bool(self.lab_ux_problem),
            fmt_i64(self.fh_score),
            fmt_f64(self.rating),
            fmt_i64(self.img_sav_kb),
            fmt_i64(self.js_sav_kb),
            fmt_i64(self.css_sav_kb),
            self.photo_url.clone().unwrap_or_default(),
            self.fh_site.clone(),
            self.account_tier.clone(),
            fmt_f64(self.latitude),
            fmt_f64(self.longitude),
        ]
    }
}

fn fmt_f64(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn fmt_ms(v: Option<f64>) -> String {
    v.map(|v| format!("{:.0}", v)).unwrap_or_default()
}

fn fmt_i64(v: Option<i64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn fmt_bool(v: Option<bool>) -> String {
    match v {
        Some(true) => "true".to_string(),
        Some(false) => "false".to_string(),
        None => String::new(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteRecord {
        SiteRecord {
            domain: "example.com".into(),
            region: "EMEA".into(),
            fh_site: "No".into(),
            account_tier: "3".into(),
        }
    }

    fn maps_hit() -> MapsResult {
        MapsResult {
            rating: Some(4.5),
            review_count: Some(120),
            title: Some("Example Tours".into()),
            category: Some("travel_agency".into()),
            latitude: Some(52.37),
            longitude: Some(4.89),
            ..Default::default()
        }
    }

    fn slow_mobile() -> PageSpeedResult {
        PageSpeedResult {
            perf_score: Some(42),
            field_lcp_ms: Some(3100.0),
            lab_lcp_ms: Some(3421.5),
            ..Default::default()
        }
    }

    fn idx(name: &str) -> usize {
        HEADERS.iter().position(|h| *h == name).unwrap()
    }

    #[test]
    fn every_record_has_39_fields() {
        assert_eq!(HEADERS.len(), 39);

        // Fully absent upstream data still yields a full-width record.
        let row = assemble(
            &site(),
            &MapsResult::default(),
            &PageSpeedResult::default(),
            &PageSpeedResult::default(),
        );
        assert_eq!(row.to_record().len(), HEADERS.len());

        let row = assemble(&site(), &maps_hit(), &slow_mobile(), &slow_mobile());
        assert_eq!(row.to_record().len(), HEADERS.len());
    }

    #[test]
    fn slow_site_scenario() {
        let row = assemble(
            &site(),
            &maps_hit(),
            &slow_mobile(),
            &PageSpeedResult::default(),
        );
        let rec = row.to_record();

        assert_eq!(rec[idx("shortname")], "example");
        assert_eq!(rec[idx("website")], "https://example.com");
        assert_eq!(rec[idx("rating_google")], "4.5");
        assert_eq!(rec[idx("reviews")], "120");
        assert_eq!(rec[idx("perf_score")], "42");
        assert_eq!(rec[idx("field_lcp")], "3100");
        assert_eq!(rec[idx("field_speed_problem")], "true");
        assert_eq!(rec[idx("lab_speed_problem")], "true");
        // CLS/INP not returned: UX flags stay empty, not "false".
        assert_eq!(rec[idx("field_ux_problem")], "");
        assert_eq!(rec[idx("lab_ux_problem")], "");
    }

    #[test]
    fn desktop_failure_leaves_only_desktop_columns_empty() {
        let row = assemble(
            &site(),
            &maps_hit(),
            &slow_mobile(),
            &PageSpeedResult::default(),
        );
        let rec = row.to_record();

        assert_eq!(rec[idx("mobile")], "42");
        assert_eq!(rec[idx("mobile_lcp")], "3422");
        assert_eq!(rec[idx("desktop")], "");
        assert_eq!(rec[idx("desktop_lcp")], "");
        assert_eq!(rec[idx("desktop_cls")], "");
        assert_eq!(rec[idx("desktop_inp")], "");
    }

    #[test]
    fn input_columns_pass_through() {
        let row = assemble(
            &site(),
            &MapsResult::default(),
            &PageSpeedResult::default(),
            &PageSpeedResult::default(),
        );
        let rec = row.to_record();
        assert_eq!(rec[idx("region")], "EMEA");
        assert_eq!(rec[idx("fh_site")], "No");
        assert_eq!(rec[idx("account_tier")], "3");
    }

    #[test]
    fn fh_score_is_mean_of_present_scores() {
        let ps = PageSpeedResult {
            perf_score: Some(42),
            accessibility: Some(88),
            seo: Some(92),
            ..Default::default()
        };
        let row = assemble(&site(), &MapsResult::default(), &ps, &PageSpeedResult::default());
        // (42 + 88 + 92) / 3 = 74
        assert_eq!(row.fh_score, Some(74));

        let row = assemble(
            &site(),
            &MapsResult::default(),
            &PageSpeedResult::default(),
            &PageSpeedResult::default(),
        );
        assert_eq!(row.fh_score, None);
    }

    #[test]
    fn assembly_is_deterministic() {
        let a = assemble(&site(), &maps_hit(), &slow_mobile(), &slow_mobile());
        let b = assemble(&site(), &maps_hit(), &slow_mobile(), &slow_mobile());
        assert_eq!(a, b);
        assert_eq!(a.to_record(), b.to_record());
    }
}
