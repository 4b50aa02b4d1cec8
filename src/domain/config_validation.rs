//! Configuration reading and validation.
//!
//! Every key is checked before any asset is loaded, and the first invalid key
//! is reported. The typed readers here are shared with the config builders
//! in the CLI.

use crate::domain::bar::Field;
use crate::domain::error::StockcastError;
use crate::domain::strategy::{
    DualMaCrossover, KdjRsiThreshold, MacdCrossover, StrategyConfig, ZScoreReversion,
};
use crate::domain::transform::ScaleMethod;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    validate_data(config)?;
    validate_preprocess(config)?;
    validate_window(config)?;
    validate_split(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    let kind = config
        .get_string("strategy", "kind")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| StockcastError::missing("strategy", "kind"))?;
    read_bool(config, "strategy", "allow_short", false)?;

    match kind.trim() {
        "dual_ma" => {
            let defaults = DualMaCrossover::default();
            validate_fast_slow(config, defaults.fast, defaults.slow)?;
        }
        "macd" => {
            let defaults = MacdCrossover::default();
            validate_fast_slow(config, defaults.fast, defaults.slow)?;
            let signal = read_usize(config, "strategy", "signal", defaults.signal)?;
            require_positive("signal", signal)?;
        }
        "kdj_rsi" => {
            let d = KdjRsiThreshold::default();
            require_positive(
                "stoch_period",
                read_usize(config, "strategy", "stoch_period", d.stoch_period)?,
            )?;
            require_positive(
                "rsi_period",
                read_usize(config, "strategy", "rsi_period", d.rsi_period)?,
            )?;
            validate_band(
                config,
                ("stoch_oversold", d.stoch_oversold),
                ("stoch_overbought", d.stoch_overbought),
            )?;
            validate_band(
                config,
                ("rsi_oversold", d.rsi_oversold),
                ("rsi_overbought", d.rsi_overbought),
            )?;
        }
        "zscore" => {
            let defaults = ZScoreReversion::default();
            if read_usize(config, "strategy", "window", defaults.window)? < 2 {
                return Err(StockcastError::invalid(
                    "strategy",
                    "window",
                    "window must be at least 2",
                ));
            }
            if read_f64(config, "strategy", "threshold", defaults.threshold)? <= 0.0 {
                return Err(StockcastError::invalid(
                    "strategy",
                    "threshold",
                    "threshold must be positive",
                ));
            }
        }
        other => {
            return Err(StockcastError::invalid(
                "strategy",
                "kind",
                format!(
                    "unknown strategy '{}' (expected one of {})",
                    other,
                    StrategyConfig::KINDS.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

pub fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, StockcastError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                StockcastError::invalid(
                    section,
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}

pub fn require_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, StockcastError> {
    read_date(config, section, key)?.ok_or_else(|| StockcastError::missing(section, key))
}

/// Comma list of field names; `None` when the key is absent.
pub fn read_fields(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<Vec<Field>>, StockcastError> {
    config
        .get_list(section, key)
        .map(|names| {
            names
                .iter()
                .map(|n| n.parse::<Field>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|reason| StockcastError::invalid(section, key, reason))
        })
        .transpose()
}

pub fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StockcastError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|_| {
            StockcastError::invalid(section, key, "expected a non-negative integer")
        }),
    }
}

pub fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, StockcastError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StockcastError::invalid(section, key, "expected a number")),
    }
}

pub fn read_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, StockcastError> {
    config
        .get_bool(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|raw| {
            StockcastError::invalid(section, key, format!("expected true or false, got '{}'", raw))
        })
}

pub fn read_scale_method(config: &dyn ConfigPort) -> Result<Option<ScaleMethod>, StockcastError> {
    config
        .get_string("preprocess", "scale_method")
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<ScaleMethod>()
                .map_err(|e| StockcastError::invalid("preprocess", "scale_method", e.to_string()))
        })
        .transpose()
}

fn validate_fast_slow(
    config: &dyn ConfigPort,
    fast_default: usize,
    slow_default: usize,
) -> Result<(), StockcastError> {
    let fast = read_usize(config, "strategy", "fast", fast_default)?;
    let slow = read_usize(config, "strategy", "slow", slow_default)?;
    require_positive("fast", fast)?;
    if slow <= fast {
        return Err(StockcastError::invalid(
            "strategy",
            "slow",
            "slow must be greater than fast",
        ));
    }
    Ok(())
}

fn require_positive(key: &str, value: usize) -> Result<(), StockcastError> {
    if value == 0 {
        return Err(StockcastError::invalid(
            "strategy",
            key,
            format!("{} must be at least 1", key),
        ));
    }
    Ok(())
}

/// Checks an (oversold, overbought) pair of `(key, default)` thresholds.
fn validate_band(
    config: &dyn ConfigPort,
    (low_key, low_default): (&str, f64),
    (high_key, high_default): (&str, f64),
) -> Result<(), StockcastError> {
    let low = read_f64(config, "strategy", low_key, low_default)?;
    let high = read_f64(config, "strategy", high_key, high_default)?;
    if low >= high {
        return Err(StockcastError::invalid(
            "strategy",
            low_key,
            format!("{} must be below {}", low_key, high_key),
        ));
    }
    Ok(())
}

fn validate_range(
    config: &dyn ConfigPort,
    section: &str,
    start_key: &str,
    end_key: &str,
    required: bool,
) -> Result<(), StockcastError> {
    let (start, end) = if required {
        (
            Some(require_date(config, section, start_key)?),
            Some(require_date(config, section, end_key)?),
        )
    } else {
        (
            read_date(config, section, start_key)?,
            read_date(config, section, end_key)?,
        )
    };
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(StockcastError::invalid(
                section,
                start_key,
                format!("{} must not be after {}", start_key, end_key),
            ));
        }
    }
    Ok(())
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => {}
        _ => return Err(StockcastError::missing("data", "dir")),
    }
    if let Some(fields) = read_fields(config, "data", "fields")? {
        if fields.is_empty() {
            return Err(StockcastError::invalid("data", "fields", "no fields selected"));
        }
    }
    validate_range(config, "data", "start_date", "end_date", false)
}

fn validate_preprocess(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    read_fields(config, "preprocess", "log_fields")?;
    let method = read_scale_method(config)?;
    let scale_fields = read_fields(config, "preprocess", "scale_fields")?.unwrap_or_default();
    if method.is_none() && !scale_fields.is_empty() {
        return Err(StockcastError::invalid(
            "preprocess",
            "scale_fields",
            "scale_fields given without scale_method",
        ));
    }
    let fields = read_fields(config, "data", "fields")?.unwrap_or_else(|| Field::ALL.to_vec());
    if let Some(field) = scale_fields.iter().find(|f| !fields.contains(*f)) {
        return Err(StockcastError::invalid(
            "preprocess",
            "scale_fields",
            format!("{} is not among [data] fields", field),
        ));
    }
    read_date(config, "preprocess", "fit_cutoff")?;
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    if read_usize(config, "window", "lag_depth", 1)? == 0 {
        return Err(StockcastError::invalid(
            "window",
            "lag_depth",
            "lag_depth must be at least 1",
        ));
    }
    let target = match config.get_string("window", "target_field") {
        None => Field::Close,
        Some(s) => s
            .parse::<Field>()
            .map_err(|reason| StockcastError::invalid("window", "target_field", reason))?,
    };
    let fields = read_fields(config, "data", "fields")?.unwrap_or_else(|| Field::ALL.to_vec());
    if !fields.contains(&target) {
        return Err(StockcastError::invalid(
            "window",
            "target_field",
            format!("{} is not among [data] fields", target),
        ));
    }
    Ok(())
}

fn validate_split(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    validate_range(config, "split", "train_start", "train_end", true)?;
    validate_range(config, "split", "valid_start", "valid_end", true)?;
    validate_range(config, "split", "test_start", "test_end", true)?;
    Ok(())
}
