//! Response normalization: fence stripping, strict parsing, citation
//! extraction.
//!
//! Everything here is a pure function of its inputs; the provider calls
//! [`normalize_response`] with whatever text and metadata the model
//! returned.

use crate::gemini::GroundingMetadata;
use crate::types::{
    CitationSource, QueryResult, WeatherError, WeatherSnapshot, PARSE_FAILURE_MESSAGE,
};

/// Remove a leading markdown code fence (```json or bare ```) and its
/// closing marker, if present. Text without fences is returned trimmed.
///
/// Models occasionally wrap their JSON in fences despite being instructed
/// not to; the inner content survives byte-for-byte modulo the markers and
/// surrounding whitespace.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };

    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Map grounding metadata to citation sources.
///
/// Keeps only entries whose web reference has both a non-empty URI and a
/// non-empty title. Order is preserved; duplicates are not collapsed.
pub fn extract_sources(metadata: Option<&GroundingMetadata>) -> Vec<CitationSource> {
    metadata
        .and_then(|m| m.grounding_chunks.as_ref())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.web.as_ref()?;
                    let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
                    let title = web.title.as_deref().filter(|t| !t.is_empty())?;
                    Some(CitationSource {
                        uri: uri.to_string(),
                        title: title.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Decode fence-stripped text into a snapshot.
///
/// Two distinct failure modes: text that is not JSON at all
/// ([`WeatherError::Parse`]), and JSON whose shape doesn't match the
/// requested schema ([`WeatherError::SchemaMismatch`]). Mis-shaped fields
/// never propagate silently into the snapshot.
pub fn parse_snapshot(text: &str) -> Result<WeatherSnapshot, WeatherError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| WeatherError::Parse(e.to_string()))?;

    serde_json::from_value(value).map_err(|e| WeatherError::SchemaMismatch(e.to_string()))
}

/// Normalize one raw model reply into a `QueryResult`.
///
/// Citation extraction happens first and is attached to the outcome either
/// way. On any decode failure the raw text and the failure detail go to
/// the log; the caller sees only the fixed parse message.
pub fn normalize_response(
    raw_text: &str,
    metadata: Option<&GroundingMetadata>,
) -> QueryResult {
    let sources = extract_sources(metadata);

    match parse_snapshot(strip_code_fence(raw_text)) {
        Ok(snapshot) => QueryResult::success(snapshot, sources),
        Err(e) => {
            tracing::warn!(error = %e, raw_text, "failed to decode model reply");
            QueryResult::failure(PARSE_FAILURE_MESSAGE, sources)
        }
    }
}
