//! Weather lookup provider: prompt assembly, dispatch, and conversion of
//! every failure into a displayable result.

use tracing::instrument;

use crate::gemini::GeminiClient;
use crate::normalize;
use crate::types::{QueryResult, WeatherError};

const DEFAULT_FORECAST_HOURS: u32 = 6;

/// Top of the instruction sent with every lookup. The location request and
/// forecast length are appended per call.
const PROMPT_HEADER: &str = "\
You are a real-time weather agent.
1. Search for the current weather and the hourly forecast for the requested location.
2. Return the data in STRICT JSON format. Do not add markdown formatting (like ```json). Just return the raw JSON string.
3. The JSON must match this structure exactly:
{
  \"location\": \"City, Country\",
  \"current\": {
    \"temp_c\": number (degrees Celsius),
    \"condition\": \"string (e.g. Sunny, Rainy)\",
    \"humidity\": number (percentage),
    \"wind_kph\": number (kilometers per hour),
    \"feels_like_c\": number,
    \"uv_index\": number,
    \"description\": \"A short, helpful sentence about the weather.\"
  },
  \"forecast\": [
    { \"time\": \"HH:MM\", \"temp_c\": number, \"condition\": \"short string\" }
  ]
}";

/// Dispatches weather lookups against a search-grounded model.
///
/// Owns an explicitly constructed [`GeminiClient`]; every lookup is
/// stateless and independent.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: GeminiClient,
    forecast_hours: u32,
}

impl WeatherProvider {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            forecast_hours: DEFAULT_FORECAST_HOURS,
        }
    }

    /// Override the forecast length requested from the model.
    pub fn with_forecast_hours(mut self, hours: u32) -> Self {
        self.forecast_hours = hours;
        self
    }

    /// Look up weather for a free-text location (a city name or a
    /// `"lat, lon"` pair).
    ///
    /// Never returns an error: every failure mode is folded into the
    /// returned [`QueryResult`]'s message. An empty query short-circuits
    /// before any network call.
    #[instrument(skip(self), level = "info")]
    pub async fn lookup(&self, query: &str) -> QueryResult {
        let query = query.trim();
        if query.is_empty() {
            return QueryResult::failure(WeatherError::EmptyQuery.user_message(), Vec::new());
        }

        let prompt = self.build_prompt(query);

        let response = match self.client.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, query, "weather dispatch failed");
                return QueryResult::failure(e.user_message(), Vec::new());
            }
        };

        // The model sometimes answers with an empty candidate list; treat
        // that as an empty JSON document so it fails parsing the same way
        // any other unusable reply does.
        let text = response.primary_text().unwrap_or_else(|| "{}".to_string());

        normalize::normalize_response(&text, response.grounding_metadata())
    }

    /// Look up weather for device-reported coordinates.
    pub async fn lookup_coords(&self, latitude: f64, longitude: f64) -> QueryResult {
        self.lookup(&format!("{}, {}", latitude, longitude)).await
    }

    fn build_prompt(&self, query: &str) -> String {
        format!(
            "{}\n\nThe forecast must cover the next {} hours, one entry per hour.\n\nLocation Request: {}",
            PROMPT_HEADER, self.forecast_hours, query,
        )
    }
}
