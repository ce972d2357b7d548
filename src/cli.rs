//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::{JsonCompanyAdapter, JsonUniverseAdapter};
use crate::domain::aggregation::{
    adjusted_emissions_metric, esg_metric, instrument_esg_metric, PortfolioAggregator,
    PortfolioMetric,
};
use crate::domain::batch::{score_batch, summarize};
use crate::domain::config::EngineConfig;
use crate::domain::error::EsgError;
use crate::domain::shared::SharedEntityStore;
use crate::domain::store::EntityStore;
use crate::ports::company_source::CompanySource;
use crate::ports::report_port::ReportPort;
use crate::ports::universe_source::UniverseSource;
use crate::telemetry;

#[derive(Parser, Debug)]
#[command(name = "esgscore", about = "Carbon emissions scoring and portfolio ESG aggregation")]
pub struct Cli {
    /// INI configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Log filter, overriding [logging] level
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a JSON batch of company records
    Score {
        #[arg(short, long)]
        input: PathBuf,
        /// CSV output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Aggregate a metric over a portfolio's look-through exposure
    Aggregate {
        #[arg(short, long)]
        universe: PathBuf,
        #[arg(short, long)]
        portfolio: String,
        #[arg(short, long, value_enum, default_value_t = Metric::Emissions)]
        metric: Metric,
        /// Date for ESG record lookup (YYYY-MM-DD); latest record when omitted
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Flatten an instrument into its atomic constituents
    Resolve {
        #[arg(short, long)]
        universe: PathBuf,
        #[arg(short, long)]
        instrument: String,
    },
    /// Check a universe for weight inconsistencies and cycles
    Validate {
        #[arg(short, long)]
        universe: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    /// Adjusted total emissions of each owning company
    Emissions,
    /// Combined ESG score of each owning company
    Esg,
    /// Combined ESG score recorded on each atomic instrument
    InstrumentEsg,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_engine_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(e) = telemetry::init(level) {
        return report(&e);
    }

    let result = match cli.command {
        Command::Score { input, output } => run_score(&config, &input, output.as_ref()),
        Command::Aggregate {
            universe,
            portfolio,
            metric,
            as_of,
        } => run_aggregate(&config, &universe, &portfolio, metric, as_of),
        Command::Resolve {
            universe,
            instrument,
        } => run_resolve(&config, &universe, &instrument),
        Command::Validate { universe } => run_validate(&config, &universe),
    };

    match result {
        Ok(code) => code,
        Err(e) => report(&e),
    }
}

fn report(err: &EsgError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, EsgError> {
    FileConfigAdapter::from_file(path)
}

pub fn load_engine_config(path: Option<&PathBuf>) -> Result<EngineConfig, EsgError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            EngineConfig::from_port(&load_config(p)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Loads a universe file as a single all-or-nothing update.
pub fn load_universe(config: &EngineConfig, path: &PathBuf) -> Result<Arc<EntityStore>, EsgError> {
    eprintln!("Loading universe from {}", path.display());
    let shared = SharedEntityStore::new(config.new_store());
    let adapter = JsonUniverseAdapter::new(path.clone());
    shared.update(|store| adapter.load_into(store))?;
    Ok(shared.snapshot())
}

pub fn run_score(
    config: &EngineConfig,
    input: &PathBuf,
    output: Option<&PathBuf>,
) -> Result<ExitCode, EsgError> {
    eprintln!("Scoring companies from {}", input.display());
    let companies = JsonCompanyAdapter::new(input.clone()).load_companies()?;
    let results = score_batch(companies, &config.calculator());

    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| EsgError::Io {
                reason: format!("failed to create {}: {}", path.display(), e),
            })?;
            let mut writer = BufWriter::new(file);
            CsvReportAdapter.write(&results, &mut writer)?;
            eprintln!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            CsvReportAdapter.write(&results, &mut handle)?;
        }
    }

    let summary = summarize(&results);
    eprintln!(
        "Scored {} companies ({} skipped)",
        summary.scored, summary.failed
    );
    Ok(ExitCode::SUCCESS)
}

/// Evaluates `metric` over a portfolio with the configured coverage policy
/// and ESG combiner.
pub fn aggregate_portfolio(
    config: &EngineConfig,
    store: &EntityStore,
    portfolio: &str,
    metric: Metric,
    asof: NaiveDate,
) -> Result<PortfolioMetric, EsgError> {
    let aggregator = PortfolioAggregator::new(store).with_policy(config.coverage);
    match metric {
        Metric::Emissions => {
            aggregator.breakdown(portfolio, adjusted_emissions_metric(config.scoring), asof)
        }
        Metric::Esg => aggregator.breakdown(portfolio, esg_metric(store, config.combiner), asof),
        Metric::InstrumentEsg => aggregator.compute_instrument_metric(
            portfolio,
            instrument_esg_metric(store, config.combiner),
            asof,
        ),
    }
}

pub fn run_aggregate(
    config: &EngineConfig,
    universe: &PathBuf,
    portfolio: &str,
    metric: Metric,
    as_of: Option<NaiveDate>,
) -> Result<ExitCode, EsgError> {
    let store = load_universe(config, universe)?;
    let asof = as_of.unwrap_or(NaiveDate::MAX);
    let result = aggregate_portfolio(config, &store, portfolio, metric, asof)?;

    eprintln!("\nPortfolio {}", portfolio);
    eprintln!("  Covered weight:   {:.6}", result.covered_weight);
    eprintln!("  Uncovered weight: {:.6}", result.uncovered_weight);
    for (id, c) in &result.contributions {
        eprintln!("  {:<16} weight {:.6}  metric {:.6}", id, c.weight, c.metric);
    }
    println!("{}", result.value);
    Ok(ExitCode::SUCCESS)
}

pub fn run_resolve(
    config: &EngineConfig,
    universe: &PathBuf,
    instrument: &str,
) -> Result<ExitCode, EsgError> {
    let store = load_universe(config, universe)?;
    let resolved = store.resolve(instrument)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (atomic, weight) in &resolved {
        writeln!(out, "{}\t{}", atomic, weight)?;
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_validate(config: &EngineConfig, universe: &PathBuf) -> Result<ExitCode, EsgError> {
    let store = load_universe(config, universe)?;
    let problems = store.validate();
    match problems.first() {
        None => {
            eprintln!("Universe is consistent");
            Ok(ExitCode::SUCCESS)
        }
        Some(first) => {
            for problem in &problems {
                eprintln!("  {problem}");
            }
            eprintln!("{} problem(s) found", problems.len());
            Ok(ExitCode::from(first))
        }
    }
}
