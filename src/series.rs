//! Monthly time axis and sales history handling

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar year-month, printed and parsed as `"YYYY-MM"`.
///
/// Backed by a `chrono::NaiveDate` pinned to the first day of the month so
/// month arithmetic stays calendar-correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| {
                ForecastError::InvalidInput(format!("invalid year-month {}-{}", year, month))
            })
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The following calendar month.
    pub fn next(&self) -> Self {
        Self(self.0 + Months::new(1))
    }

    pub fn plus_months(&self, n: u32) -> Self {
        Self(self.0 + Months::new(n))
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: &YearMonth) -> i64 {
        (other.year() as i64 - self.year() as i64) * 12
            + (other.month() as i64 - self.month() as i64)
    }

    /// Calendar quarter, 1 through 4.
    pub fn quarter(&self) -> u32 {
        (self.month() - 1) / 3 + 1
    }

    /// Position within the calendar quarter: 0, 1 or 2.
    pub fn quarter_position(&self) -> usize {
        ((self.month() - 1) % 3) as usize
    }
}

impl FromStr for YearMonth {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").map_err(|_| {
            ForecastError::InvalidInput(format!("month must be formatted YYYY-MM, got '{}'", s))
        })?;
        Ok(Self(date))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: ForecastError| D::Error::custom(e.to_string()))
    }
}

/// One observed month of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub month: YearMonth,
    pub sales: i64,
}

/// Historical monthly sales mapped onto a contiguous time axis.
///
/// Input points must be chronologically strictly increasing; months inside
/// the observed span that carry no input value are kept as gaps so estimators
/// can decide how to treat them.
#[derive(Debug, Clone)]
pub struct SalesHistory {
    start: YearMonth,
    values: Vec<Option<f64>>,
    observed: usize,
}

impl SalesHistory {
    /// Minimum number of observed points required to forecast at all.
    pub const MIN_POINTS: usize = 3;

    pub fn from_points(points: &[SalesPoint]) -> Result<Self> {
        if points.len() < Self::MIN_POINTS {
            return Err(ForecastError::InsufficientHistory {
                min: Self::MIN_POINTS,
                got: points.len(),
            });
        }
        for p in points {
            if p.sales < 0 {
                return Err(ForecastError::InvalidInput(format!(
                    "sales must be non-negative, got {} for {}",
                    p.sales, p.month
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].month <= pair[0].month {
                return Err(ForecastError::InvalidInput(format!(
                    "months must be strictly increasing ({} follows {})",
                    pair[1].month, pair[0].month
                )));
            }
        }

        let start = points[0].month;
        let last = points[points.len() - 1].month;
        let span = start.months_until(&last) as usize + 1;
        let mut values = vec![None; span];
        for p in points {
            values[start.months_until(&p.month) as usize] = Some(p.sales as f64);
        }

        Ok(Self {
            start,
            values,
            observed: points.len(),
        })
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    /// Length of the contiguous axis, gaps included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of actually observed points.
    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn last_month(&self) -> YearMonth {
        self.start.plus_months(self.values.len() as u32 - 1)
    }

    pub fn month_at(&self, index: usize) -> YearMonth {
        self.start.plus_months(index as u32)
    }

    /// Per-month values on the contiguous axis; `None` marks a gap.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Dense copy of the series with interior gaps filled by linear
    /// interpolation between the bracketing observations. A cheap stand-in
    /// for likelihood-based gap handling; good enough for differencing and
    /// for seeding recursive forecasts.
    pub fn interpolated(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.values.len());
        for (i, v) in self.values.iter().enumerate() {
            match v {
                Some(x) => out.push(*x),
                None => {
                    // first and last are always observed, so both brackets exist
                    let prev = self.values[..i]
                        .iter()
                        .rposition(|v| v.is_some())
                        .expect("leading value is observed");
                    let next = i + self.values[i..]
                        .iter()
                        .position(|v| v.is_some())
                        .expect("trailing value is observed");
                    let a = self.values[prev].unwrap();
                    let b = self.values[next].unwrap();
                    let frac = (i - prev) as f64 / (next - prev) as f64;
                    out.push(a + (b - a) * frac);
                }
            }
        }
        out
    }
}
