use std::path::PathBuf;
use std::time::Duration;

/// Run configuration for the audit pipeline.
///
/// These used to be edit-in-source constants in the original script; making them
/// an explicit value lets tests drive the pipeline with varied filter sets.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Cap on rows that survive the filters. None = unlimited.
    pub max_sites: Option<usize>,
    /// Keep only rows whose region matches exactly.
    pub region: Option<String>,
    /// Keep only rows whose account tier is in this set. Empty = no filter.
    pub account_tiers: Vec<String>,
    /// Keep only rows whose fh_site flag matches exactly.
    pub fh_site: Option<String>,
    /// Drop tier-0 accounts.
    pub exclude_tier_0: bool,
    /// Politeness pause between consecutive sites.
    pub delay: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sites1.csv"),
            output: PathBuf::from("output/website_audit_results.csv"),
            max_sites: None,
            region: None,
            account_tiers: Vec::new(),
            fh_site: None,
            exclude_tier_0: false,
            delay: Duration::from_millis(1000),
        }
    }
}
