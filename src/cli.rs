//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvSeriesSource;
use crate::adapters::csv_artifact_adapter::{
    write_signal_file, write_signal_records, write_split_batch,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar::Field;
use crate::domain::config_validation::{
    read_bool, read_date, read_f64, read_fields, read_scale_method, read_usize, require_date,
    validate_pipeline_config, validate_strategy_config,
};
use crate::domain::error::StockcastError;
use crate::domain::pipeline::{run_batch, PipelineConfig, ScalingConfig};
use crate::domain::split::{DateRange, Split, SplitBatch};
use crate::domain::strategy::{
    run_on_bars, Decision, DualMaCrossover, KdjRsiThreshold, MacdCrossover, SignalStrategy,
    StrategyConfig, ZScoreReversion,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::series_source::SeriesSource;

#[derive(Parser, Debug)]
#[command(
    name = "stockcast",
    about = "Leakage-free forecasting datasets and indicator trading signals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build train/valid/test feature-label arrays for every configured asset
    Prepare {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory to write <asset>_<segment>_{x,y}.csv into
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Process assets one at a time instead of on the worker pool
        #[arg(long)]
        sequential: bool,
    },
    /// Run the configured strategy over one asset and emit per-bar decisions
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        asset: String,
        /// CSV file for the decisions (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List assets available in the configured data directory
    ListAssets {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Prepare {
            config,
            output,
            sequential,
        } => run_prepare(&config, output.as_deref(), sequential),
        Command::Signals {
            config,
            asset,
            output,
        } => run_signals(&config, &asset, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListAssets { config } => run_list_assets(&config),
    }
}

fn fail(err: StockcastError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

pub fn data_dir(config: &dyn ConfigPort) -> Result<PathBuf, StockcastError> {
    config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| StockcastError::missing("data", "dir"))
}

pub fn build_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, StockcastError> {
    let train = DateRange::new(
        require_date(config, "split", "train_start")?,
        require_date(config, "split", "train_end")?,
    );
    let split = Split {
        train,
        valid: DateRange::new(
            require_date(config, "split", "valid_start")?,
            require_date(config, "split", "valid_end")?,
        ),
        test: DateRange::new(
            require_date(config, "split", "test_start")?,
            require_date(config, "split", "test_end")?,
        ),
    };

    // Scalers are fitted on the training window unless told otherwise.
    let scaling = match read_scale_method(config)? {
        Some(method) => Some(ScalingConfig {
            method,
            fields: read_fields(config, "preprocess", "scale_fields")?,
            fit_cutoff: Some(read_date(config, "preprocess", "fit_cutoff")?.unwrap_or(train.end)),
        }),
        None => None,
    };

    let target = match config.get_string("window", "target_field") {
        Some(s) => s
            .parse::<Field>()
            .map_err(|reason| StockcastError::invalid("window", "target_field", reason))?,
        None => Field::Close,
    };

    Ok(PipelineConfig {
        fields: read_fields(config, "data", "fields")?.unwrap_or_else(|| Field::ALL.to_vec()),
        start_date: read_date(config, "data", "start_date")?,
        end_date: read_date(config, "data", "end_date")?,
        log_fields: read_fields(config, "preprocess", "log_fields")?.unwrap_or_default(),
        scaling,
        lag_depth: read_usize(config, "window", "lag_depth", 1)?,
        target,
        split,
    })
}

pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, StockcastError> {
    let kind = config
        .get_string("strategy", "kind")
        .ok_or_else(|| StockcastError::missing("strategy", "kind"))?;
    let allow_short = read_bool(config, "strategy", "allow_short", false)?;

    let strategy = match kind.trim() {
        "dual_ma" => {
            let d = DualMaCrossover::default();
            StrategyConfig::DualMa(DualMaCrossover {
                fast: read_usize(config, "strategy", "fast", d.fast)?,
                slow: read_usize(config, "strategy", "slow", d.slow)?,
                allow_short,
            })
        }
        "macd" => {
            let d = MacdCrossover::default();
            StrategyConfig::Macd(MacdCrossover {
                fast: read_usize(config, "strategy", "fast", d.fast)?,
                slow: read_usize(config, "strategy", "slow", d.slow)?,
                signal: read_usize(config, "strategy", "signal", d.signal)?,
                allow_short,
            })
        }
        "kdj_rsi" => {
            let d = KdjRsiThreshold::default();
            StrategyConfig::KdjRsi(KdjRsiThreshold {
                stoch_period: read_usize(config, "strategy", "stoch_period", d.stoch_period)?,
                rsi_period: read_usize(config, "strategy", "rsi_period", d.rsi_period)?,
                stoch_oversold: read_f64(config, "strategy", "stoch_oversold", d.stoch_oversold)?,
                stoch_overbought: read_f64(
                    config,
                    "strategy",
                    "stoch_overbought",
                    d.stoch_overbought,
                )?,
                rsi_oversold: read_f64(config, "strategy", "rsi_oversold", d.rsi_oversold)?,
                rsi_overbought: read_f64(config, "strategy", "rsi_overbought", d.rsi_overbought)?,
                allow_short,
            })
        }
        // Mean reversion always shorts; allow_short does not apply.
        "zscore" => {
            let d = ZScoreReversion::default();
            StrategyConfig::ZScore(ZScoreReversion {
                window: read_usize(config, "strategy", "window", d.window)?,
                threshold: read_f64(config, "strategy", "threshold", d.threshold)?,
            })
        }
        other => {
            return Err(StockcastError::invalid(
                "strategy",
                "kind",
                format!("unknown strategy '{}'", other),
            ))
        }
    };
    Ok(strategy)
}

/// Assets named in `[data] assets`, or everything the source can serve.
pub fn resolve_assets(
    config: &dyn ConfigPort,
    source: &dyn SeriesSource,
) -> Result<Vec<String>, StockcastError> {
    match config.get_list("data", "assets") {
        Some(assets) if !assets.is_empty() => Ok(assets),
        _ => Ok(source.list_assets()?),
    }
}

fn print_shapes(batch: &SplitBatch) {
    for (i, asset) in batch.assets.iter().enumerate() {
        eprintln!(
            "  {}: train {:?}/{}, valid {:?}/{}, test {:?}/{}",
            asset,
            batch.x_train[i].dim(),
            batch.y_train[i].len(),
            batch.x_valid[i].dim(),
            batch.y_valid[i].len(),
            batch.x_test[i].dim(),
            batch.y_test[i].len(),
        );
    }
}

fn run_prepare(config_path: &Path, output: Option<&Path>, sequential: bool) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_pipeline_config(&adapter) {
        return fail(e);
    }
    let pipeline = match build_pipeline_config(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    // Stage 2: Resolve the asset universe
    let source = match data_dir(&adapter) {
        Ok(dir) => CsvSeriesSource::new(dir),
        Err(e) => return fail(e),
    };
    let assets = match resolve_assets(&adapter, &source) {
        Ok(a) if a.is_empty() => return fail(StockcastError::NoAssets),
        Ok(a) => a,
        Err(e) => return fail(e),
    };

    // Stage 3: Run the batch
    eprintln!(
        "Preparing {} assets (lag depth {}, target {}, {})",
        assets.len(),
        pipeline.lag_depth,
        pipeline.target,
        if sequential { "sequential" } else { "parallel" },
    );
    let result = run_batch(&source, &assets, &pipeline, !sequential);

    for skipped in &result.skipped {
        eprintln!("warning: skipping {} ({})", skipped.asset, skipped.error);
    }
    if result.batch.is_empty() {
        return fail(StockcastError::NoAssets);
    }

    eprintln!("\n=== Split Shapes (rows x features / labels) ===");
    print_shapes(&result.batch);

    // Stage 4: Write artifacts
    if let Some(dir) = output {
        match write_split_batch(dir, &result.batch) {
            Ok(files) => eprintln!("\nWrote {} files to {}", files.len(), dir.display()),
            Err(e) => return fail(e),
        }
    }

    eprintln!(
        "\nPrepared {} of {} assets",
        result.batch.len(),
        assets.len()
    );
    ExitCode::SUCCESS
}

fn run_signals(config_path: &Path, asset: &str, output: Option<&Path>) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s.build(),
        Err(e) => return fail(e),
    };

    // Stage 2: Load the asset's bars
    let source = match (
        data_dir(&adapter),
        read_date(&adapter, "data", "start_date"),
        read_date(&adapter, "data", "end_date"),
    ) {
        (Ok(dir), Ok(start), Ok(end)) => CsvSeriesSource::new(dir).with_date_range(start, end),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return fail(e),
    };
    let series = match source.load(asset) {
        Ok(s) => s,
        Err(e) => return fail(e.into()),
    };

    // Stage 3: Compute indicators and run the state machine
    eprintln!(
        "Running {} on {}: {} bars, indicators {}",
        strategy.name(),
        asset,
        series.len(),
        strategy
            .required_indicators()
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    );
    let records = match run_on_bars(strategy.as_ref(), &series.bars) {
        Ok(r) => r,
        Err(e) => return fail(e.into()),
    };

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in records.iter().filter(|r| r.decision != Decision::Hold) {
        *counts.entry(r.decision.to_string()).or_default() += 1;
    }
    eprintln!("\n=== Decisions ===");
    for (decision, count) in &counts {
        eprintln!("  {}: {}", decision, count);
    }
    if let Some(last) = records.last() {
        eprintln!("  final position: {}", last.position);
    }

    // Stage 4: Emit records
    match output {
        Some(path) => match write_signal_file(path, &records) {
            Ok(()) => {
                eprintln!("\nDecisions written to: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        },
        None => match write_signal_records(io::stdout().lock(), &records) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(StockcastError::Output {
                path: "<stdout>".into(),
                reason: e.to_string(),
            }),
        },
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_pipeline_config(&adapter) {
        return fail(e);
    }
    let pipeline = match build_pipeline_config(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    eprintln!("\nPipeline:");
    eprintln!(
        "  fields: {}",
        pipeline
            .fields
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!(
        "  lag depth: {}, target: {}",
        pipeline.lag_depth, pipeline.target
    );
    if let Some(scaling) = &pipeline.scaling {
        eprintln!(
            "  scaling: {} fitted on rows up to {}",
            scaling.method,
            scaling
                .fit_cutoff
                .map_or_else(|| "the end".to_string(), |d| d.to_string())
        );
    }
    let split = pipeline.split;
    eprintln!("  train: {} to {}", split.train.start, split.train.end);
    eprintln!("  valid: {} to {}", split.valid.start, split.valid.end);
    eprintln!("  test:  {} to {}", split.test.start, split.test.end);

    if adapter.get_string("strategy", "kind").is_some() {
        if let Err(e) = validate_strategy_config(&adapter) {
            return fail(e);
        }
        match build_strategy_config(&adapter) {
            Ok(config) => {
                let strategy = config.build();
                eprintln!("\nStrategy: {}", strategy.name());
                for indicator in strategy.required_indicators() {
                    eprintln!("  {}", indicator);
                }
            }
            Err(e) => return fail(e),
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_assets(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let source = match data_dir(&adapter) {
        Ok(dir) => CsvSeriesSource::new(dir),
        Err(e) => return fail(e),
    };

    match source.list_assets() {
        Ok(assets) if assets.is_empty() => {
            eprintln!("No assets found");
            ExitCode::SUCCESS
        }
        Ok(assets) => {
            for asset in &assets {
                println!("{}", asset);
            }
            eprintln!("{} assets found", assets.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e.into()),
    }
}
