use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::AuditConfig;

/// One row of the input CSV, after trimming.
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub domain: String,
    pub region: String,
    pub fh_site: String,
    pub account_tier: String,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    fh_site: Option<String>,
    #[serde(default)]
    account_tier: Option<String>,
}

/// Load the input CSV and apply the configured filters.
pub fn load_sites(cfg: &AuditConfig) -> Result<Vec<SiteRecord>> {
    let file = std::fs::File::open(&cfg.input)
        .with_context(|| format!("Failed to open input CSV: {}", cfg.input.display()))?;
    let sites = read_sites(file, cfg)?;
    info!("Loaded {} sites from {}", sites.len(), cfg.input.display());
    Ok(sites)
}

/// Parse site rows from any reader, filtering as we go.
///
/// Filter semantics match the original audit script: region/tier/fh/tier-0
/// checks per row, and the max-sites cap counts rows that survive the filters.
pub fn read_sites<R: Read>(reader: R, cfg: &AuditConfig) -> Result<Vec<SiteRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut sites = Vec::new();

    for (i, row) in rdr.deserialize::<RawRow>().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed input row {}: {}", i + 2, e);
                continue;
            }
        };

        let domain = row.domain.as_deref().unwrap_or("").trim().to_string();
        if domain.is_empty() {
            warn!("Skipping input row {}: missing domain", i + 2);
            continue;
        }
        let region = row.region.as_deref().unwrap_or("").trim().to_string();
        let fh_site = row.fh_site.as_deref().unwrap_or("").trim().to_string();
        let account_tier = row.account_tier.as_deref().unwrap_or("").trim().to_string();

        if let Some(r) = &cfg.region {
            if &region != r {
                continue;
            }
        }
        if !cfg.account_tiers.is_empty() && !cfg.account_tiers.contains(&account_tier) {
            continue;
        }
        if let Some(f) = &cfg.fh_site {
            if &fh_site != f {
                continue;
            }
        }
        if cfg.exclude_tier_0 && account_tier == "0" {
            continue;
        }

        sites.push(SiteRecord {
            domain,
            region,
            fh_site,
            account_tier,
        });

        if let Some(max) = cfg.max_sites {
            if sites.len() >= max {
                break;
            }
        }
    }

    Ok(sites)
}

/// Extract domains for the SEMrush variant, which tolerates looser input CSVs.
///
/// Column priority: name, shortname, website; otherwise the first field that
/// already contains a dot. A dotless value gets a `.com` suffix.
pub fn read_domains<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut domains = Vec::new();

    for row in rdr.records() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed input row: {}", e);
                continue;
            }
        };

        let by_name = |col: &str| -> Option<String> {
            let idx = headers.iter().position(|h| h == col)?;
            let val = row.get(idx)?.trim();
            (!val.is_empty()).then(|| val.to_string())
        };

        let mut domain = by_name("name")
            .or_else(|| by_name("shortname"))
            .or_else(|| by_name("website"))
            .or_else(|| {
                row.iter()
                    .map(str::trim)
                    .find(|v| v.contains('.'))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        if domain.is_empty() {
            continue;
        }
        if !domain.contains('.') {
            domain.push_str(".com");
        }
        domains.push(normalize_host(&domain));
    }

    Ok(domains)
}

pub fn load_domains(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open input CSV: {}", path.display()))?;
    read_domains(file)
}

/// Strip scheme, `www.` and any path from a configured domain value.
pub fn normalize_host(raw: &str) -> String {
    let re = Regex::new(r"^(?:https?://)?(?:www\.)?([^/\s]+)").unwrap();
    re.captures(raw.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| raw.trim().to_lowercase())
}

/// First label of the normalized host: `example.com` -> `example`.
pub fn shortname(domain: &str) -> String {
    let host = normalize_host(domain);
    host.split('.').next().unwrap_or(&host).to_string()
}

// ── Tests ──
