//! Bird Migration Risk Service - command line
//!
//! Fetches radar vertical profiles for a station and day, compares them
//! against the same day in previous years, and scores how much of the
//! night's migration flew through the rotor-swept altitude band.
//!
//! Usage:
//!   birdrisk_service report --station bejab --date 2023-05-01
//!   birdrisk_service report --station nohur --json
//!   birdrisk_service stations
//!   birdrisk_service serve --port 8080
//!
//! Environment:
//!   DATABASE_URL     - warehouse holding radar_sites (optional)
//!   BIRDRISK_CONFIG  - path to birdrisk.toml
//!   RUST_LOG         - log filter, default "info"

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use birdrisk_service::analysis::risk::RiskOutcome;
use birdrisk_service::astro::NoaaSunCalculator;
use birdrisk_service::config::{self, ServiceConfig};
use birdrisk_service::endpoint::{self, EndpointState};
use birdrisk_service::ingest::vpts::{HttpVptsSource, VptsSource};
use birdrisk_service::pipeline::{default_report_date, run_for_date, DailyReport};
use birdrisk_service::stations::{self, StationRegistry};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "birdrisk_service")]
#[command(about = "Bird migration density and wind-turbine altitude risk from weather radar profiles")]
struct Cli {
    /// Configuration file (default: birdrisk.toml, or $BIRDRISK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for one station and day
    Report {
        /// Radar code, e.g. bejab
        #[arg(long)]
        station: String,
        /// Day to report (YYYY-MM-DD); defaults to today minus the data latency
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Override the critical band height above the station, meters
        #[arg(long)]
        band_offset: Option<f64>,
        /// Override how many prior years make up the baseline
        #[arg(long)]
        baseline_years: Option<u32>,
    },
    /// List known radar stations
    Stations,
    /// Serve reports over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Report {
            station,
            date,
            json,
            band_offset,
            baseline_years,
        } => {
            let mut config = config;
            if let Some(offset) = band_offset {
                config.pipeline.band_offset_m = offset;
            }
            if let Some(years) = baseline_years {
                config.pipeline.baseline_years = years;
            }
            if let Err(e) = config.pipeline.validate() {
                eprintln!("❌ {}", e);
                return ExitCode::FAILURE;
            }
            report(&config, &station, date, json)
        }
        Commands::Stations => list_stations(&config),
        Commands::Serve { port, bind } => serve(config, &bind, port),
    }
}

fn http_source(config: &ServiceConfig) -> Result<Arc<dyn VptsSource>, ExitCode> {
    match HttpVptsSource::new(&config.source.base_url, config.source.timeout()) {
        Ok(source) => Ok(Arc::new(source)),
        Err(e) => {
            eprintln!("❌ Failed to build HTTP client: {}", e);
            Err(ExitCode::FAILURE)
        }
    }
}

fn report(config: &ServiceConfig, station_id: &str, date: Option<NaiveDate>, json: bool) -> ExitCode {
    let registry = stations::load_registry(config);
    let Some(station) = registry.find(station_id) else {
        eprintln!("❌ Unknown station '{}'. Known: {}", station_id, registry.ids().join(", "));
        return ExitCode::FAILURE;
    };

    let source = match http_source(config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let date = date.unwrap_or_else(|| {
        default_report_date(Utc::now().date_naive(), config.pipeline.data_latency_days)
    });

    let daily = match run_for_date(source, &NoaaSunCalculator, station, date, &config.pipeline) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&daily) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&daily);
    }
    ExitCode::SUCCESS
}

fn print_report(daily: &DailyReport) {
    let r = &daily.report;
    println!("🐦 {} on {}", r.station.station_id, r.date);
    println!("=============================\n");

    if let Some(sun) = &daily.sun_times {
        println!("   Sunrise {}  Sunset {} (UTC)", sun.sunrise.format("%H:%M"), sun.sunset.format("%H:%M"));
    }
    match &r.peak_headline {
        Some(headline) => println!("   {}", headline),
        None => println!("   No density readings for this day"),
    }
    println!();

    println!("📈 {} ({} time steps)", r.current_label, r.current_series.len());
    match &r.baseline_label {
        Some(label) => println!("📉 {} ({} time steps)", label, r.baseline_series.len()),
        None => println!("📉 No baseline years available"),
    }
    for skipped in &daily.skipped_baselines {
        println!("   ✗ {} skipped: {}", skipped.year, skipped.reason);
    }
    println!();

    println!("⚠️  Share of density in the critical band");
    print_risk("   Current day", &r.current_risk);
    print_risk("   Baseline   ", &r.baseline_risk);
}

fn print_risk(label: &str, outcome: &RiskOutcome) {
    match outcome {
        RiskOutcome::Scored { band, gauge, .. } => println!(
            "{}: {} ({:.0}-{:.0} m, {:?})",
            label,
            outcome.caption(),
            band.lower,
            band.upper,
            gauge.band
        ),
        RiskOutcome::Undefined { .. } => println!("{}: {}", label, outcome.caption()),
    }
}

fn list_stations(config: &ServiceConfig) -> ExitCode {
    let registry = stations::load_registry(config);
    print_stations(&registry);
    if registry.is_empty() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_stations(registry: &StationRegistry) {
    println!("📡 Radar stations ({:?})", registry.origin);
    for s in &registry.stations {
        println!(
            "   {:<6} lat {:>8.4}  lon {:>9.4}  elev {:>6.0} m",
            s.station_id, s.latitude, s.longitude, s.elevation
        );
    }
}

fn serve(config: ServiceConfig, bind: &str, port: u16) -> ExitCode {
    let source = match http_source(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let registry = stations::load_registry(&config);
    print_stations(&registry);

    let state = EndpointState {
        registry,
        source,
        sun: Arc::new(NoaaSunCalculator),
        settings: config.pipeline,
    };

    let addr = format!("{}:{}", bind, port);
    println!("\n🚀 Serving on http://{}", addr);
    println!("   GET /health");
    println!("   GET /stations");
    println!("   GET /risk/{{station}}[/{{YYYY-MM-DD}}]\n");

    match endpoint::start_endpoint_server(&addr, state) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
