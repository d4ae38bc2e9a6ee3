//! `POST /explain-stock`: ask the LLM why a ticker moved on a given day.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{required, FunctionsState};
use crate::error::FunctionError;

pub const SYSTEM_PROMPT: &str = "You are a financial news analyst covering AI and technology stocks. \
Explain in 2-3 concise sentences the most likely reasons for the stock's price movement on the given date, \
citing concrete news, earnings, or sector events. Do not give investment advice.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainStockRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub change_percent: Option<f64>,
    /// `YYYY-MM-DD`; today (UTC) when absent.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExplainStockResponse {
    pub explanation: String,
}

pub fn stock_prompt(symbol: &str, change_percent: f64, date: NaiveDate) -> String {
    let direction = if change_percent >= 0.0 { "rise" } else { "fall" };
    format!(
        "Why did {} stock {} {:+.2}% on {}?",
        symbol,
        direction,
        change_percent,
        date.format("%Y-%m-%d")
    )
}

fn parse_date(value: &Option<String>) -> Result<NaiveDate, FunctionError> {
    match value.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(Utc::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| FunctionError::Validation(format!("Invalid date: {}. Expected YYYY-MM-DD", raw))),
    }
}

#[tracing::instrument(skip_all, fields(function = "explain-stock"))]
pub async fn explain_stock(
    state: &FunctionsState,
    req: ExplainStockRequest,
) -> Result<ExplainStockResponse, FunctionError> {
    let symbol = required(&req.symbol, "symbol")?.to_uppercase();
    let change_percent = req
        .change_percent
        .filter(|c| c.is_finite())
        .ok_or_else(|| FunctionError::missing_field("changePercent"))?;
    let date = parse_date(&req.date)?;
    let llm = state
        .llm
        .as_deref()
        .ok_or_else(|| FunctionError::not_configured("PERPLEXITY_API_KEY"))?;

    let explanation = llm
        .complete(SYSTEM_PROMPT, &stock_prompt(&symbol, change_percent, date))
        .await
        .map_err(|e| {
            tracing::warn!(%symbol, error = %e, "stock explanation failed");
            FunctionError::from(e)
        })?;

    tracing::info!(%symbol, %date, "stock explained");
    Ok(ExplainStockResponse { explanation })
}
