mod commands;
mod logging;
mod progress;
mod render;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{anyhow, Context};
use clap::{CommandFactory, Parser};
use commands::{AnalyzeArgs, Cli, Commands, RunArgs};
use dotenv::dotenv;
use mailbench_core::analysis::PreFilterStat;
use mailbench_core::runs::{ClassifierMode, RunRequest, RunStatus, RunStore};
use mailbench_core::{AppConfig, CommandClassifier, ResultsAnalyzer, RunEngine};
use progress::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match mailbench_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Run(run_args)) => run_classifier(&config, run_args),
        Some(Commands::Analyze(analyze_args)) => run_analyze(&config, analyze_args),
        Some(Commands::History { status, mode }) => {
            run_history(&config, status.as_deref(), mode.as_deref())
        }
        Some(Commands::Show { run_id, json }) => run_show(&config, &run_id, json),
        Some(Commands::Delete { run_id, yes }) => run_delete(&config, &run_id, yes),
        Some(Commands::PrintConfig) => toml::to_string_pretty(&config)
            .map(|rendered| println!("{}", rendered))
            .map_err(anyhow::Error::from),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<RunStore> {
    RunStore::open(
        &config.storage.database_path,
        config.storage.max_history_items,
    )
    .with_context(|| format!("opening run store {}", config.storage.database_path))
}

fn run_classifier(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let classifier = CommandClassifier::from_config(&config.classifier)
        .ok_or_else(|| anyhow!("no classifier command configured (classifier.command)"))?;

    let defaults = &config.classifier;
    let mode = match args.mode {
        Some(mode) => mode.parse::<ClassifierMode>()?,
        None => defaults.default_mode,
    };
    let request = RunRequest {
        source_path: args.source,
        out_path: args.out.unwrap_or_else(|| defaults.output_directory.clone()),
        mode,
        use_filter: args.use_filter.unwrap_or(defaults.default_use_filter),
        async_mode: args.async_mode.unwrap_or(defaults.default_async_mode),
        max_concurrency: args
            .max_concurrency
            .unwrap_or(defaults.default_max_concurrency),
    };

    let engine = RunEngine::new(config.clone(), open_store(config)?, classifier);
    let reporter = CliReporter::new();
    let record = engine.run(&request, &reporter)?;

    println!();
    render::print_run(&record);

    if record.status == RunStatus::Failed {
        return Err(anyhow!(
            "run {} failed: {}",
            record.run_id,
            record.error_message.unwrap_or_default()
        ));
    }
    info!("Run {} completed", record.run_id);
    Ok(())
}

fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let stats = match &args.stats {
        Some(path) => Some(read_stats(path)?),
        None => None,
    };

    let analyzer = ResultsAnalyzer::new(config.analysis.clone());
    let analyses = if args.parallel {
        analyzer.analyze_results_parallel(&args.path, stats.as_deref())?
    } else {
        analyzer.analyze_results_with(&args.path, stats.as_deref(), &CliReporter::new())?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analyses)?);
    } else {
        render::print_analyses(&analyses);
    }
    Ok(())
}

fn read_stats(path: &Path) -> anyhow::Result<Vec<PreFilterStat>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading pre-filter stats {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing pre-filter stats {}", path.display()))
}

fn run_history(config: &AppConfig, status: Option<&str>, mode: Option<&str>) -> anyhow::Result<()> {
    let status = status.map(str::parse::<RunStatus>).transpose()?;
    let mode = mode.map(str::parse::<ClassifierMode>).transpose()?;

    let runs = open_store(config)?.list(status, mode)?;
    if runs.is_empty() {
        println!("No runs recorded.");
    }
    for record in &runs {
        render::print_run_line(record);
    }
    Ok(())
}

fn run_show(config: &AppConfig, run_id: &str, json: bool) -> anyhow::Result<()> {
    let record = open_store(config)?
        .get(run_id)?
        .ok_or_else(|| anyhow!("run not found: {}", run_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        render::print_run(&record);
    }
    Ok(())
}

fn run_delete(config: &AppConfig, run_id: &str, yes: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if !yes && !prompt_confirm(&format!("Delete run {}?", run_id), Some(false))? {
        return Ok(());
    }
    store.delete(run_id)?;
    println!("Run {} deleted", run_id);
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
