//! Daily bar representation and the fixed numeric field schema.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Numeric fields of a daily bar, in source column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    Close,
    High,
    Low,
    Volume,
    Turnover,
    Amplitude,
    ChangePct,
    ChangeAmt,
    TurnoverRate,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Open,
        Field::Close,
        Field::High,
        Field::Low,
        Field::Volume,
        Field::Turnover,
        Field::Amplitude,
        Field::ChangePct,
        Field::ChangeAmt,
        Field::TurnoverRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::Close => "close",
            Field::High => "high",
            Field::Low => "low",
            Field::Volume => "volume",
            Field::Turnover => "turnover",
            Field::Amplitude => "amplitude",
            Field::ChangePct => "change_pct",
            Field::ChangeAmt => "change_amt",
            Field::TurnoverRate => "turnover_rate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts snake_case (`change_pct`) and CamelCase (`ChangePct`) spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name().replace('_', "") == normalized)
            .ok_or_else(|| format!("unknown field '{}'", s.trim()))
    }
}

/// One asset's record for a single trading day. Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub turnover: f64,
    pub amplitude: f64,
    pub change_pct: f64,
    pub change_amt: f64,
    pub turnover_rate: f64,
}

impl Bar {
    /// Bar with every price field set to `close` and the derived fields zeroed.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            close,
            high: close,
            low: close,
            volume: 0.0,
            turnover: 0.0,
            amplitude: 0.0,
            change_pct: 0.0,
            change_amt: 0.0,
            turnover_rate: 0.0,
        }
    }

    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Open => self.open,
            Field::Close => self.close,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Volume => self.volume,
            Field::Turnover => self.turnover,
            Field::Amplitude => self.amplitude,
            Field::ChangePct => self.change_pct,
            Field::ChangeAmt => self.change_amt,
            Field::TurnoverRate => self.turnover_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 10.0,
            close: 10.5,
            high: 11.0,
            low: 9.8,
            volume: 120_000.0,
            turnover: 1_250_000.0,
            amplitude: 12.0,
            change_pct: 5.0,
            change_amt: 0.5,
            turnover_rate: 0.8,
        }
    }

    #[test]
    fn get_reads_every_field() {
        let bar = sample_bar();
        let values: Vec<f64> = Field::ALL.iter().map(|f| bar.get(*f)).collect();
        assert_eq!(
            values,
            vec![10.0, 10.5, 11.0, 9.8, 120_000.0, 1_250_000.0, 12.0, 5.0, 0.5, 0.8]
        );
    }

    #[test]
    fn field_parse_accepts_both_spellings() {
        assert_eq!("change_pct".parse::<Field>(), Ok(Field::ChangePct));
        assert_eq!("ChangePct".parse::<Field>(), Ok(Field::ChangePct));
        assert_eq!(" Close ".parse::<Field>(), Ok(Field::Close));
        assert_eq!("TurnoverRate".parse::<Field>(), Ok(Field::TurnoverRate));
    }

    #[test]
    fn field_parse_rejects_unknown() {
        assert!("vwap".parse::<Field>().is_err());
    }

    #[test]
    fn field_name_round_trips_through_display() {
        for field in Field::ALL {
            assert_eq!(field.to_string().parse::<Field>(), Ok(field));
        }
    }

    #[test]
    fn from_close_fills_prices() {
        let bar = Bar::from_close(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 7.0);
        assert_eq!(bar.open, 7.0);
        assert_eq!(bar.high, 7.0);
        assert_eq!(bar.low, 7.0);
        assert_eq!(bar.volume, 0.0);
    }
}
