//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing::level_filters::LevelFilter;

use crate::adapters::csv_series_adapter::{CsvSeriesAdapter, read_series_file};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::report::{HtmlReportAdapter, format_price};
use crate::domain::aligner::{AlignedTable, align_labelled};
use crate::domain::config_validation::validate_config;
use crate::domain::dashboard::{DEFAULT_MANUFACTURING_INDEX, DashboardConfig, DashboardReport, run_dashboard};
use crate::domain::error::MacroError;
use crate::domain::forecast::{AssetClass, ForecastTable, forecast_signal};
use crate::domain::signal::{SignalRules, TrendTieBreak, classify_with};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::series_port::SeriesPort;

pub const API_KEY_ENV: &str = "FRED_API_KEY";

#[derive(Parser, Debug)]
#[command(name = "macrolens", about = "Monetary liquidity versus asset prices")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch series, classify, forecast and write the HTML dashboard
    Dashboard {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Manufacturing index reading, overrides [signal] manufacturing_index
        #[arg(long, allow_negative_numbers = true, value_parser = parse_reading)]
        ism: Option<f64>,
        /// Read macro series from the CSV directory instead of FRED
        #[arg(long)]
        offline: bool,
    },
    /// Classify and forecast from manually entered readings
    Signal {
        #[arg(long, allow_negative_numbers = true, value_parser = parse_reading)]
        latest: f64,
        #[arg(long, allow_negative_numbers = true, value_parser = parse_reading)]
        previous: f64,
        #[arg(long, allow_negative_numbers = true, value_parser = parse_reading)]
        conditions: f64,
        #[arg(
            long,
            allow_negative_numbers = true,
            value_parser = parse_reading,
            default_value_t = DEFAULT_MANUFACTURING_INDEX
        )]
        ism: f64,
        /// How an unchanged liquidity reading is classified: rising or falling
        #[arg(long, default_value = "rising", value_parser = parse_tie_break)]
        tie: TrendTieBreak,
    },
    /// Align an asset CSV with a liquidity CSV by calendar month
    Align {
        #[arg(long)]
        asset: PathBuf,
        #[arg(long)]
        liquidity: PathBuf,
        #[arg(long)]
        label: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Readings must be finite, matching the `[signal]` config checks.
pub fn parse_reading(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(format!("'{}' is not a finite number", raw)),
        Err(e) => Err(format!("'{}' is not a number: {}", raw, e)),
    }
}

pub fn parse_tie_break(raw: &str) -> Result<TrendTieBreak, String> {
    raw.parse::<TrendTieBreak>()
}

pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Dashboard {
            config,
            output,
            ism,
            offline,
        } => run_dashboard_command(&config, output.as_ref(), ism, offline),
        Command::Signal {
            latest,
            previous,
            conditions,
            ism,
            tie,
        } => run_signal(latest, previous, conditions, ism, tie),
        Command::Align {
            asset,
            liquidity,
            label,
        } => run_align(&asset, &liquidity, label.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn parse_number(adapter: &dyn ConfigPort, section: &str, key: &str, default: f64) -> Result<f64, MacroError> {
    match adapter.get_string(section, key) {
        None => Ok(default),
        Some(raw) => parse_reading(&raw).map_err(|reason| MacroError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason,
        }),
    }
}

pub fn build_dashboard_config(adapter: &dyn ConfigPort) -> Result<DashboardConfig, MacroError> {
    let defaults = DashboardConfig::default();

    let tie_break = match adapter.get_string("signal", "trend_tie") {
        Some(raw) => raw.parse::<TrendTieBreak>().map_err(|reason| MacroError::ConfigInvalid {
            section: "signal".into(),
            key: "trend_tie".into(),
            reason,
        })?,
        None => TrendTieBreak::default(),
    };

    let signal_rules = SignalRules {
        tie_break,
        conditions_threshold: parse_number(adapter, "signal", "conditions_threshold", 0.0)?,
    };
    let forecast_table = ForecastTable::standard().with_contraction_threshold(parse_number(
        adapter,
        "signal",
        "contraction_threshold",
        50.0,
    )?);

    let symbols = AssetClass::ALL.map(|asset| {
        adapter
            .get_string("assets", asset.config_key())
            .unwrap_or_else(|| asset.default_symbol().to_string())
    });

    Ok(DashboardConfig {
        liquidity_series: adapter
            .get_string("fred", "liquidity_series")
            .unwrap_or(defaults.liquidity_series),
        conditions_series: adapter
            .get_string("fred", "conditions_series")
            .unwrap_or(defaults.conditions_series),
        macro_lookback_days: adapter.get_int("fred", "lookback_days", defaults.macro_lookback_days),
        price_lookback_days: adapter.get_int("prices", "lookback_days", defaults.price_lookback_days),
        symbols,
        manufacturing_index: parse_number(
            adapter,
            "signal",
            "manufacturing_index",
            DEFAULT_MANUFACTURING_INDEX,
        )?,
        signal_rules,
        forecast_table,
    })
}

/// The config value wins over the environment. Neither present means
/// the credential is missing.
pub fn resolve_api_key(adapter: &dyn ConfigPort, env_value: Option<String>) -> Option<String> {
    adapter
        .get_string("fred", "api_key")
        .or_else(|| env_value.filter(|v| !v.trim().is_empty()))
}

pub fn data_dir(adapter: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        adapter
            .get_string("prices", "data_dir")
            .unwrap_or_else(|| "data".to_string()),
    )
}

#[cfg(feature = "fred")]
fn build_macro_port(adapter: &dyn ConfigPort, offline: bool) -> Box<dyn SeriesPort> {
    use crate::adapters::fred_adapter::{DEFAULT_BASE_URL, FredAdapter, FredConfig};

    if offline {
        tracing::info!("offline mode: reading macro series from CSV");
        return Box::new(CsvSeriesAdapter::new(data_dir(adapter)));
    }

    let mut fred_config = FredConfig::new(resolve_api_key(adapter, std::env::var(API_KEY_ENV).ok()));
    fred_config.base_url = adapter
        .get_string("fred", "base_url")
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    fred_config.timeout_secs = adapter.get_int("fred", "timeout_secs", 10).max(1) as u64;

    match FredAdapter::new(fred_config) {
        Ok(fred) => Box::new(fred),
        Err(e) => {
            warn!(error = %e, "FRED client unavailable, reading macro series from CSV");
            Box::new(CsvSeriesAdapter::new(data_dir(adapter)))
        }
    }
}

#[cfg(not(feature = "fred"))]
fn build_macro_port(adapter: &dyn ConfigPort, offline: bool) -> Box<dyn SeriesPort> {
    if !offline {
        warn!("built without the fred feature, reading macro series from CSV");
    }
    Box::new(CsvSeriesAdapter::new(data_dir(adapter)))
}

fn run_dashboard_command(
    config_path: &Path,
    output_path: Option<&PathBuf>,
    ism_override: Option<f64>,
    offline: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut config = match build_dashboard_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(ism) = ism_override {
        config.manufacturing_index = ism;
    }

    let macro_port = build_macro_port(&adapter, offline);
    let price_port = CsvSeriesAdapter::new(data_dir(&adapter));

    let output = output_path.cloned().unwrap_or_else(|| {
        PathBuf::from(
            adapter
                .get_string("report", "output")
                .unwrap_or_else(|| "dashboard.html".to_string()),
        )
    });

    run_dashboard_pipeline(
        macro_port.as_ref(),
        &price_port,
        &config,
        Local::now().date_naive(),
        &output,
    )
}

pub fn run_dashboard_pipeline(
    macro_port: &dyn SeriesPort,
    price_port: &dyn SeriesPort,
    config: &DashboardConfig,
    today: NaiveDate,
    output: &Path,
) -> ExitCode {
    eprintln!(
        "Evaluating liquidity ({}) and conditions ({}) via {}",
        config.liquidity_series,
        config.conditions_series,
        macro_port.name()
    );
    let report = run_dashboard(macro_port, price_port, config, today);

    print_summary(&report);

    let writer = HtmlReportAdapter::new(&config.liquidity_series, &config.conditions_series);
    match writer.write(&report, &output.to_string_lossy()) {
        Ok(()) => {
            eprintln!("\nDashboard written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write dashboard: {e}");
            (&e).into()
        }
    }
}

pub fn print_summary(report: &DashboardReport) {
    if !report.warnings.is_empty() {
        eprintln!("\n=== Data Source Warnings ===");
        for w in &report.warnings {
            eprintln!("  warning: {}", w);
        }
    }

    eprintln!("\n=== Macro ===");
    eprintln!(
        "Liquidity:        {} ({})",
        report.signal.trend, report.signal.liquidity_signal
    );
    eprintln!(
        "Conditions:       {:.2} ({})",
        report.snapshot.latest_financial_conditions, report.signal.conditions_state
    );
    eprintln!("Manufacturing:    {:.1}", report.manufacturing_index);
    if !report.snapshot.series_available {
        eprintln!("Data:             synthetic fallback");
    }

    eprintln!("\n=== Markets & Impact ===");
    for panel in &report.panels {
        let overlap = if panel.aligned.is_empty() {
            "no correlation data available".to_string()
        } else {
            format!("{} aligned months", panel.aligned.len())
        };
        eprintln!(
            "  {:<24} {:<10} {:>14}  {}  ({})",
            panel.asset.display_name(),
            panel.symbol,
            format_price(panel.latest_price),
            panel.forecast,
            overlap,
        );
    }
}

fn run_signal(latest: f64, previous: f64, conditions: f64, ism: f64, tie_break: TrendTieBreak) -> ExitCode {
    let rules = SignalRules {
        tie_break,
        ..SignalRules::default()
    };

    let signal = classify_with(latest, previous, conditions, &rules);
    let forecasts = forecast_signal(&ForecastTable::standard(), &signal, ism);

    println!("trend: {}", signal.trend);
    println!("liquidity_signal: {}", signal.liquidity_signal);
    println!("conditions_state: {}", signal.conditions_state);
    for entry in forecasts.iter() {
        println!("{}: {}", entry.asset.config_key(), entry);
    }
    ExitCode::SUCCESS
}

pub fn align_files(asset: &Path, liquidity: &Path, label: Option<&str>) -> Result<AlignedTable, MacroError> {
    let label = label.map(str::to_string).unwrap_or_else(|| {
        asset
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string())
    });
    let asset_series = read_series_file(asset, &label, NaiveDate::MIN)?;
    let liquidity_series = read_series_file(liquidity, "liquidity", NaiveDate::MIN)?;
    Ok(align_labelled(&asset_series, &liquidity_series, &label))
}

pub fn write_aligned_csv<W: io::Write>(table: &AlignedTable, out: W) -> Result<(), MacroError> {
    let to_io = |e: csv::Error| MacroError::Io(io::Error::other(e));
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["period", table.asset_label.as_str(), "liquidity"])
        .map_err(to_io)?;
    for row in &table.rows {
        wtr.write_record([
            row.period.to_string(),
            row.asset_value.to_string(),
            row.liquidity_value.to_string(),
        ])
        .map_err(to_io)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_align(asset: &Path, liquidity: &Path, label: Option<&str>) -> ExitCode {
    let table = match align_files(asset, liquidity, label) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if table.is_empty() {
        eprintln!("No overlapping months: no correlation data available");
    }

    match write_aligned_csv(&table, io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = match build_dashboard_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nMacro series:");
    eprintln!("  liquidity:  {}", config.liquidity_series);
    eprintln!("  conditions: {}", config.conditions_series);
    match resolve_api_key(&adapter, std::env::var(API_KEY_ENV).ok()) {
        Some(_) => eprintln!("  credential: configured"),
        None => eprintln!("  credential: missing (synthetic data will be used)"),
    }

    eprintln!("\nAssets:");
    for asset in AssetClass::ALL {
        eprintln!("  {:<24} {}", asset.display_name(), config.symbol(asset));
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
