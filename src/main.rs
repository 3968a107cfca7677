use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use covid_tracker::app::dashboard_use_case::DashboardUseCase;
use covid_tracker::choropleth::{fill_color_expression, max_cases};
use covid_tracker::config::Config;
use covid_tracker::format::{flag_emoji, format_with_suffix};
use covid_tracker::infra::http_client::ReqwestHttp;
use covid_tracker::observability::init_logging;
use covid_tracker::observability::metrics as tracker_metrics;
use covid_tracker::pipeline::processing::alias::{AliasDirection, AliasResolver};
use covid_tracker::summary::{global_totals, top_countries, SortBy};
use covid_tracker::types::{CanonicalCountry, CovidStats, Timeline};

#[derive(Parser)]
#[command(name = "covid_tracker")]
#[command(about = "COVID-19 country statistics reconciled across the JHU CSSE and Worldometers feeds")]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every reconciled country
    Countries {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the countries with the most cases or deaths
    Top {
        #[arg(long, value_enum, default_value_t = SortBy::Cases)]
        by: SortBy,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Show the global or a per-country timeline, most recent first
    Timeline {
        /// Country name (either vocabulary) or ISO code; global when omitted
        #[arg(long)]
        country: Option<String>,
        /// Only fetch the last N days
        #[arg(long)]
        days: Option<u32>,
        /// Number of rows to print
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Print the choropleth fill-colour expression as JSON
    Choropleth,
    /// Report alias entries that do not round-trip between the two vocabularies
    Aliases,
}

fn print_country_row(country: &CanonicalCountry) {
    println!(
        "{} {:<40} {:>10} {:>10}",
        flag_emoji(country.iso2()),
        country.name,
        format_with_suffix(country.stats.confirmed),
        format_with_suffix(country.stats.deaths)
    );
}

fn print_totals(totals: CovidStats) {
    println!(
        "   {:<40} {:>10} {:>10}",
        "Global",
        format_with_suffix(totals.confirmed),
        format_with_suffix(totals.deaths)
    );
}

fn print_timeline(title: &str, timeline: &Timeline, rows: usize) {
    let deaths: HashMap<_, _> = timeline.deaths_formatted().into_iter().collect();
    let cases = timeline.cases_formatted();
    if cases.is_empty() {
        println!("No data available for {}.", title);
        return;
    }
    println!("📈 {}", title);
    for (date, confirmed) in cases.into_iter().take(rows) {
        let died = deaths.get(&date).copied().unwrap_or(0);
        println!("   {}  {:>10}  {:>10}", date, format_with_suffix(confirmed), format_with_suffix(died));
    }
}

/// Match on canonical name, either vocabulary's spelling, or ISO code
fn find_country<'a>(
    countries: &'a [CanonicalCountry],
    query: &str,
    resolver: &AliasResolver<'_>,
) -> Option<&'a CanonicalCountry> {
    let resolved = resolver.resolve(query, AliasDirection::TimeSeriesToSnapshot);
    countries.iter().find(|c| {
        c.name.eq_ignore_ascii_case(query)
            || c.name == resolved
            || c.iso3().is_some_and(|code| code.eq_ignore_ascii_case(query))
            || c.iso2().is_some_and(|code| code.eq_ignore_ascii_case(query))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = init_logging();

    let cli = Cli::parse();

    let metrics_handle = if cli.metrics {
        Some(tracker_metrics::init().map_err(anyhow::Error::msg)?)
    } else {
        None
    };

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    let http = Arc::new(ReqwestHttp::new(config.timeout())?);
    let use_case = DashboardUseCase::from_config(http, &config);

    match cli.command {
        Commands::Countries { json } => {
            let countries = use_case.load_countries().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&countries)?);
            } else {
                println!("🌍 {} countries", countries.len());
                for country in &countries {
                    print_country_row(country);
                }
                print_totals(global_totals(&countries));
            }
        }
        Commands::Top { by, limit } => {
            let countries = use_case.load_countries().await?;
            println!("🏆 Top {} by {:?}", limit, by);
            for country in top_countries(&countries, by, limit) {
                print_country_row(country);
            }
        }
        Commands::Timeline { country, days, rows } => match country {
            None => {
                let timeline = use_case.load_global_timeline(days).await?;
                print_timeline("Global Totals", &timeline, rows);
            }
            Some(query) => {
                let countries = use_case.load_countries().await?;
                let resolver = AliasResolver::new(use_case.aliases());
                let target = match find_country(&countries, &query, &resolver) {
                    Some(found) => found.clone(),
                    None => {
                        warn!("{} is not among the reconciled countries, querying by name", query);
                        CanonicalCountry::from_time_series(query.clone(), CovidStats::default())
                    }
                };
                let timeline = use_case.load_country_timeline(&target, days).await?;
                print_timeline(&target.name, &timeline.timeline, rows);
            }
        },
        Commands::Choropleth => {
            let countries = use_case.load_countries().await?;
            let expression = fill_color_expression(&countries, max_cases(&countries));
            println!("{}", serde_json::to_string_pretty(&expression)?);
        }
        Commands::Aliases => {
            let tables = use_case.aliases();
            for direction in [AliasDirection::TimeSeriesToSnapshot, AliasDirection::SnapshotToTimeSeries] {
                println!("📖 {}: {} entries", direction, tables.len(direction));
            }
            let asymmetries = tables.asymmetries();
            if asymmetries.is_empty() {
                println!("✅ Alias tables are mutually consistent");
            } else {
                println!("⚠️  {} alias entries do not round-trip:", asymmetries.len());
                for entry in &asymmetries {
                    println!(
                        "   [{}] {} -> {} -> {}",
                        entry.direction, entry.name, entry.resolved, entry.round_trip
                    );
                }
            }
        }
    }

    if let Some(handle) = metrics_handle {
        info!("Rendering metrics");
        println!("{}", handle.render());
    }

    Ok(())
}
