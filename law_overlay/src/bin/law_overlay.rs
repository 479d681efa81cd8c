use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use law_overlay::{
    ChartSession, LawCatalog, MappingTable,
    config::resolve_config,
    law::{default_catalog, load_catalog_path},
    mapping::rules::{KeywordRules, default_rules, load_rules_path},
    report::ValidationReport,
    validation::run_gate,
};
use ohlc_bars::{
    Bar,
    models::timeframe::ChartTimeframe,
    providers::{BarSource, csv::CsvFileSource},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Law overlay derivation and validation")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build a plan for every law and check it is drawable.
    Validate {
        #[command(flatten)]
        bars: BarArgs,
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(long, value_name = "FILE", default_value = "law-validation-report.json")]
        report: PathBuf,
    },
    /// Emit the law → mapping table as JSON.
    Mapping {
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the merged overlay for the given laws as JSON.
    Plan {
        #[command(flatten)]
        bars: BarArgs,
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(long = "law", value_name = "ID", required = true)]
        laws: Vec<String>,
    },
}

#[derive(Args)]
struct BarArgs {
    #[arg(long, value_name = "FILE")]
    csv: PathBuf,
    #[arg(long, default_value = "SAMPLE")]
    symbol: String,
    #[arg(long, default_value = "1h")]
    timeframe: ChartTimeframe,
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    mapping: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.cmd {
        Cmd::Validate { bars, sources, report } => {
            let cfg = resolve_config(sources.config.as_deref())?;
            let catalog = load_catalog(sources.catalog.as_deref())?;
            let mapping = load_mapping(&sources, &catalog)?;
            let series = load_bars(&bars)?;

            let checks = run_gate(&catalog, &series, &mapping, &cfg);
            let report_doc = ValidationReport::new(bars.csv.display().to_string(), series.len(), checks);
            println!("{report_doc}");
            report_doc.write_json(&report)?;
            info!(path = %report.display(), "wrote validation report");
            Ok(report_doc.all_passed())
        }
        Cmd::Mapping { sources, out } => {
            let catalog = load_catalog(sources.catalog.as_deref())?;
            let mapping = load_mapping(&sources, &catalog)?;
            let json = mapping.to_json_pretty()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("write mapping {}", path.display()))?;
                    info!(path = %path.display(), laws = mapping.len(), "wrote mapping");
                }
                None => println!("{json}"),
            }
            Ok(true)
        }
        Cmd::Plan { bars, sources, laws } => {
            let cfg = resolve_config(sources.config.as_deref())?;
            let catalog = load_catalog(sources.catalog.as_deref())?;
            let mapping = load_mapping(&sources, &catalog)?;
            let series = load_bars(&bars)?;

            let mut session = ChartSession::new(catalog, mapping, cfg);
            session.set_bars(series);
            for id in &laws {
                session.apply_law(id)?;
            }
            let merged = session.merged();
            println!("{}", serde_json::to_string_pretty(&merged)?);
            Ok(true)
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<LawCatalog> {
    match path {
        Some(p) => load_catalog_path(p),
        None => default_catalog(),
    }
}

fn load_mapping(sources: &SourceArgs, catalog: &LawCatalog) -> Result<MappingTable> {
    if let Some(path) = &sources.mapping {
        let text = std::fs::read_to_string(path).with_context(|| format!("read mapping {}", path.display()))?;
        let table = MappingTable::from_json_str(&text).with_context(|| format!("parse mapping {}", path.display()))?;
        let missing = table.missing_ids(catalog);
        if !missing.is_empty() {
            warn!(?missing, "mapping file has no entry for some laws");
        }
        return Ok(table);
    }

    let owned: KeywordRules;
    let rules = match &sources.rules {
        Some(path) => {
            owned = load_rules_path(path)?;
            &owned
        }
        None => default_rules()?,
    };
    Ok(MappingTable::build(catalog, rules))
}

fn load_bars(args: &BarArgs) -> Result<Vec<Bar>> {
    let source = CsvFileSource::new(args.csv.clone(), args.symbol.clone(), args.timeframe);
    let series = source
        .fetch_series()
        .with_context(|| format!("load bars from {}", args.csv.display()))?;
    if !series.is_chartable() {
        bail!("no usable bars in {}", args.csv.display());
    }
    Ok(series.bars)
}
