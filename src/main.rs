mod classify;
mod clients;
mod config;
mod input;
mod output;
mod report;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::clients::maps::MapsClient;
use crate::clients::pagespeed::{PageSpeedClient, Strategy};
use crate::clients::semrush::{self, SemrushClient};
use crate::config::AuditConfig;
use crate::output::CsvSink;

#[derive(Parser)]
#[command(name = "website_audit", about = "Business website audit via Maps, PageSpeed and SEMrush")]
struct Cli {
    /// Defaults to a full `audit` run when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit sites via Google Maps + PageSpeed Insights
    Audit {
        /// Input CSV (domain, region, fh_site, account_tier)
        #[arg(long, default_value = "sites1.csv")]
        input: PathBuf,
        /// Output CSV path
        #[arg(long, default_value = "output/website_audit_results.csv")]
        output: PathBuf,
        /// Max sites to audit (default: all rows surviving the filters)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Keep only rows with this region
        #[arg(long)]
        region: Option<String>,
        /// Keep only rows with one of these account tiers (repeatable)
        #[arg(long = "tier")]
        tiers: Vec<String>,
        /// Keep only rows with this fh_site value
        #[arg(long)]
        fh_site: Option<String>,
        /// Drop tier-0 accounts
        #[arg(long)]
        exclude_tier_0: bool,
        /// Pause between consecutive sites, in milliseconds
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
    },
    /// Fetch SEMrush domain KPIs
    Semrush {
        #[arg(long, default_value = "sites1.csv")]
        input: PathBuf,
        #[arg(long, default_value = "output/website_audit_results.csv")]
        output: PathBuf,
        /// Pause between consecutive domains, in milliseconds
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        None => run_audit(AuditConfig::default()).await,
        Some(Commands::Audit {
            input,
            output,
            limit,
            region,
            tiers,
            fh_site,
            exclude_tier_0,
            delay_ms,
        }) => {
            run_audit(AuditConfig {
                input,
                output,
                max_sites: limit,
                region,
                account_tiers: tiers,
                fh_site,
                exclude_tier_0,
                delay: Duration::from_millis(delay_ms),
            })
            .await
        }
        Some(Commands::Semrush {
            input,
            output,
            delay_ms,
        }) => run_semrush(&input, &output, Duration::from_millis(delay_ms)).await,
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Sequential audit pipeline: Maps lookup + two PageSpeed runs per site,
/// one flushed output row each. Per-site failures degrade to empty cells.
async fn run_audit(cfg: AuditConfig) -> Result<()> {
    let api_key = clients::require_env("GOOGLE_API_KEY")?;

    let sites = input::load_sites(&cfg)?;
    if sites.is_empty() {
        println!("No sites to audit (check input file and filters).");
        return Ok(());
    }
    println!("Auditing {} sites...", sites.len());

    let http = clients::http_client()?;
    let maps = MapsClient::new(http.clone(), api_key.clone());
    let pagespeed = PageSpeedClient::new(http, api_key);
    let mut sink = CsvSink::create(&cfg.output, &report::HEADERS)?;

    let pb = ProgressBar::new(sites.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut maps_hits = 0usize;
    let mut audits_ok = 0usize;

    for (i, site) in sites.iter().enumerate() {
        let maps_result = maps.lookup(&site.domain, &site.region).await;
        if maps_result.title.is_some() || maps_result.rating.is_some() {
            maps_hits += 1;
        }

        let url = format!("https://{}", input::normalize_host(&site.domain));
        let mobile = pagespeed.audit(&url, Strategy::Mobile).await;
        let desktop = pagespeed.audit(&url, Strategy::Desktop).await;
        if mobile.perf_score.is_some() || desktop.perf_score.is_some() {
            audits_ok += 1;
        }

        let row = report::assemble(site, &maps_result, &mobile, &desktop);
        sink.write(&row.to_record())?;
        pb.inc(1);

        if i + 1 < sites.len() {
            tokio::time::sleep(cfg.delay).await;
        }
    }

    pb.finish_and_clear();
    info!(
        "Audited {} sites ({} Maps matches, {} PageSpeed audits ok)",
        sites.len(),
        maps_hits,
        audits_ok
    );
    println!("Wrote {} rows to {}", sites.len(), cfg.output.display());
    Ok(())
}

/// SEMrush variant: three report lookups per domain, one output row each.
async fn run_semrush(input: &Path, output: &Path, delay: Duration) -> Result<()> {
    let api_key = clients::require_env("SEMRUSH_API_KEY")?;

    let domains = input::load_domains(input)?;
    if domains.is_empty() {
        println!("No domains found in {}", input.display());
        return Ok(());
    }
    println!("Fetching SEMrush KPIs for {} domains...", domains.len());

    let http = clients::http_client()?;
    let client = SemrushClient::new(http, api_key);
    let mut sink = CsvSink::create(output, &semrush::HEADERS)?;

    let pb = ProgressBar::new(domains.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    for (i, domain) in domains.iter().enumerate() {
        let result = client.lookup(domain).await;
        sink.write(&result.to_record(domain))?;
        pb.inc(1);

        if i + 1 < domains.len() {
            tokio::time::sleep(delay).await;
        }
    }

    pb.finish_and_clear();
    println!("Wrote {} rows to {}", domains.len(), output.display());
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
