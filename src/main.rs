use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wordtally::app::{self, EXIT_CONFIG_ERROR};
use wordtally::config::PipelineConfig;
use wordtally::io::SinkFormat;

/// Count words across a partitioned corpus and report the target words.
#[derive(Parser, Debug)]
#[command(name = "wordtally", version, about, long_about = None)]
struct Cli {
    /// Source location (a path, optionally prefixed with file://)
    source: Option<String>,

    /// Target word to report; repeat for several (defaults to the standard five)
    #[arg(short, long = "target", value_name = "TARGET")]
    targets: Vec<String>,

    /// Directory to write the global counts to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Encoding of the persisted counts (text, json, bincode)
    #[arg(long)]
    format: Option<SinkFormat>,

    /// Worker threads (0 = one per CPU)
    #[arg(long)]
    workers: Option<usize>,

    /// Records per partition
    #[arg(long, value_name = "N")]
    records_per_partition: Option<usize>,

    /// Also write an HTML report to this file
    #[arg(long, value_name = "PATH")]
    html_report: Option<PathBuf>,

    /// Also write the report as JSON to this file
    #[arg(long, value_name = "PATH")]
    json_report: Option<PathBuf>,

    /// Write a JSON record of the run to this file
    #[arg(long, value_name = "PATH")]
    run_record: Option<PathBuf>,

    /// TOML config file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(cli: Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if cli.source.is_some() {
        config.source = cli.source;
    }
    if !cli.targets.is_empty() {
        config.targets = cli.targets;
    }
    if cli.output.is_some() {
        config.output = cli.output;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(records) = cli.records_per_partition {
        config.records_per_partition = records;
    }
    if cli.html_report.is_some() {
        config.html_report = cli.html_report;
    }
    if cli.json_report.is_some() {
        config.json_report = cli.json_report;
    }
    if cli.run_record.is_some() {
        config.run_record = cli.run_record;
    }

    config.validate()?;
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    app::init_logging(cli.verbose);

    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    std::process::exit(app::run(&config));
}
