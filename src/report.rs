//! Output assembly: the forecast report and its explanation lines

use crate::costs::{CostAssumptions, CostLines};
use crate::error::Result;
use crate::exog::ExogOutcome;
use crate::series::YearMonth;
use serde::{Deserialize, Serialize};

/// One forecasted month with its cost breakdown. Field names match the wire
/// contract of the surrounding HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastedMonth {
    pub month: YearMonth,
    pub sales: i64,
    /// Two-sided interval on sales: `[low, high]`.
    pub sales_pi: [i64; 2],
    pub cogs: i64,
    pub labor: i64,
    pub rent: i64,
    pub utilities: i64,
    pub marketing: i64,
    pub profit: i64,
}

impl ForecastedMonth {
    pub(crate) fn new(month: YearMonth, sales: i64, sales_pi: [i64; 2], lines: CostLines) -> Self {
        Self {
            month,
            sales,
            sales_pi,
            cogs: lines.cogs,
            labor: lines.labor,
            rent: lines.rent,
            utilities: lines.utilities,
            marketing: lines.marketing,
            profit: lines.profit,
        }
    }
}

/// The full forecast response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub forecast: Vec<ForecastedMonth>,
    /// 1-based month index at which cumulative profit first recovers the
    /// upfront investment, or the sentinel when it never does.
    pub payback_month: u32,
    /// Fraction of the first 12 (or fewer) forecasted months with strictly
    /// positive profit.
    pub payback_prob_12m: f64,
    /// Descriptive name of the model(s) that contributed.
    pub model: String,
    pub explain: Vec<String>,
}

impl ForecastReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything the assembler needs beyond the month rows themselves.
pub(crate) struct ReportContext<'a> {
    pub assumptions: &'a CostAssumptions,
    pub exog: &'a ExogOutcome,
    pub exog_coef: Option<f64>,
    pub ensemble: bool,
    pub quarter_weights: [f64; 3],
    pub noise_low: f64,
    pub noise_high: f64,
}

/// Assemble the final report with its deterministic explanation lines.
pub(crate) fn assemble(
    forecast: Vec<ForecastedMonth>,
    payback_month: u32,
    payback_prob_12m: f64,
    ctx: ReportContext<'_>,
) -> ForecastReport {
    let exog_used = ctx.exog.signal.is_some();

    let mut model = if exog_used {
        "SARIMA+exog(foot-traffic)".to_string()
    } else {
        "SARIMA (history only)".to_string()
    };
    if ctx.ensemble {
        model.push_str(" + bagged-trees(0.4) ensemble");
    }
    model.push_str(" + monthly weights + random noise");

    let [w1, w2, w3] = ctx.quarter_weights;
    let mut explain = vec![
        format!(
            "cost assumptions: cogs rate {:.2}, labor base {}",
            ctx.assumptions.cogs_rate,
            thousands(ctx.assumptions.labor_base)
        ),
        format!(
            "quarterly foot traffic is split across months with {:.2}/{:.2}/{:.2} weights",
            w1, w2, w3
        ),
        format!(
            "a random monthly factor in {:.2}-{:.2} is applied to point forecasts, so repeated calls differ slightly",
            ctx.noise_low, ctx.noise_high
        ),
    ];

    if let Some(signal) = &ctx.exog.signal {
        explain.push(format!(
            "base quarterly foot traffic nearby \u{2248} {}",
            thousands(signal.base as i64)
        ));
    }
    explain.push(ctx.exog.source.describe());

    if let (Some(coef), Some(signal)) = (ctx.exog_coef, &ctx.exog.signal) {
        if let Some(&last) = signal.hist.last() {
            let delta = coef * 0.10 * last;
            explain.push(format!(
                "a 10% increase in foot traffic shifts predicted sales by approximately {}",
                thousands(delta.round() as i64)
            ));
        }
    }

    ForecastReport {
        forecast,
        payback_month,
        payback_prob_12m,
        model,
        explain,
    }
}

/// Format an integer with thousands separators, e.g. 30000 -> "30,000".
pub(crate) fn thousands(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
