use serde::{Deserialize, Serialize};

/// Fixed message shown when the model's reply cannot be decoded.
pub const PARSE_FAILURE_MESSAGE: &str =
    "Failed to parse weather data from AI response. Please try again.";

/// Fixed message shown when a lookup is attempted with no location.
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a location to look up.";

/// Fallback when an underlying failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred.";

/// Current conditions for one location, as emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub condition: String,
    pub humidity: f64,
    pub wind_kph: f64,
    pub feels_like_c: f64,
    pub uv_index: f64,
    pub description: String,
}

/// One hourly forecast entry. Order is chronological and must be preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: String,
    pub temp_c: f64,
    pub condition: String,
}

/// Complete weather answer for one lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastPoint>,
}

/// One grounding reference returned by the search-enabled model.
///
/// Both fields are guaranteed non-empty; entries missing either are dropped
/// during extraction. Duplicates are allowed and order is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSource {
    pub uri: String,
    pub title: String,
}

/// Discriminated outcome of one weather lookup.
///
/// Either `data` is populated and `error` is `None`, or `data` is `None`
/// and `error` carries a displayable message. Citations ride along in both
/// cases since their extraction is independent of parsing.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub data: Option<WeatherSnapshot>,
    pub sources: Vec<CitationSource>,
    pub error: Option<String>,
}

impl QueryResult {
    pub fn success(data: WeatherSnapshot, sources: Vec<CitationSource>) -> Self {
        Self {
            data: Some(data),
            sources,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, sources: Vec<CitationSource>) -> Self {
        Self {
            data: None,
            sources,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

/// Weather lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Empty location query")]
    EmptyQuery,

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl WeatherError {
    /// User-facing message for this failure.
    ///
    /// Transport and service failures surface the underlying message
    /// verbatim when one exists; decoding failures collapse to the fixed
    /// parse message (detail goes to the log, not the user).
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::EmptyQuery => EMPTY_QUERY_MESSAGE.to_string(),
            WeatherError::InvalidApiKey(msg) => {
                non_empty_or(msg, "Gemini API key is invalid. Check settings.")
            }
            WeatherError::QuotaExceeded(msg) => {
                non_empty_or(msg, "The weather service is busy. Please try again later.")
            }
            WeatherError::ServiceUnavailable(msg) => {
                non_empty_or(msg, "The weather service is unavailable. Please try again later.")
            }
            WeatherError::InvalidRequest(msg) | WeatherError::Api { message: msg, .. } => {
                non_empty_or(msg, GENERIC_FAILURE_MESSAGE)
            }
            WeatherError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again.".to_string()
            }
            WeatherError::Network(e) => {
                let msg = e.to_string();
                non_empty_or(&msg, GENERIC_FAILURE_MESSAGE)
            }
            WeatherError::Parse(_) | WeatherError::SchemaMismatch(_) => {
                PARSE_FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// Whether the failure happened before any network call was made.
    pub fn is_input_error(&self) -> bool {
        matches!(self, WeatherError::EmptyQuery)
    }
}

fn non_empty_or(msg: &str, fallback: &str) -> String {
    let trimmed = msg.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
