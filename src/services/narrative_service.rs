use tracing::{error, info};

use crate::errors::AppError;
use crate::models::PeriodAggregate;
use crate::services::llm_service::{CompletionRequest, LlmService};

const NARRATIVE_TEMPERATURE: f32 = 0.3;

/// Statistics embedded in the narrative prompt
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeInputs {
    pub latest_close: f64,
    pub mean_volume: f64,
    pub min_low: f64,
    pub max_high: f64,
}

impl NarrativeInputs {
    pub fn from_periods(periods: &[PeriodAggregate]) -> Option<Self> {
        let latest = periods.last()?;
        Some(Self {
            latest_close: latest.close,
            mean_volume: periods.iter().map(|p| p.volume).sum::<f64>() / periods.len() as f64,
            min_low: periods.iter().map(|p| p.low).fold(f64::INFINITY, f64::min),
            max_high: periods.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

fn build_narrative_prompt(symbol: &str, inputs: &NarrativeInputs) -> String {
    format!(
        r#"Analyze the following stock data for {}:

Latest price: ${:.2}
Average volume: {:.0}
Price range: ${:.2} - ${:.2}

Please provide an in-detail analysis covering:
1. Overall stock performance and behavior
2. Volatility assessment
3. Whether it's better suited for long-term or short-term investment
4. Key observations about price movements
Limit the response to 500-600 words."#,
        symbol, inputs.latest_close, inputs.mean_volume, inputs.min_low, inputs.max_high
    )
}

/// Generate a narrative analysis for `symbol` from chronological periods.
///
/// The reply is returned as-is; generation failures propagate.
pub async fn compose_narrative(
    llm_service: &LlmService,
    symbol: &str,
    periods: &[PeriodAggregate],
) -> Result<String, AppError> {
    let inputs = NarrativeInputs::from_periods(periods).ok_or_else(|| {
        AppError::InsufficientData(format!("No periods to describe for {}", symbol))
    })?;

    info!("Generating narrative for {} over {} periods", symbol, periods.len());
    let prompt = build_narrative_prompt(symbol, &inputs);

    llm_service
        .complete(CompletionRequest::new(prompt, NARRATIVE_TEMPERATURE))
        .await
        .map_err(|e| {
            error!("Narrative generation failed for {}: {}", symbol, e);
            AppError::Generation(e)
        })
}
