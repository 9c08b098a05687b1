//! Grounded weather lookups for Skycast
//!
//! Asks a search-grounded generative model for current conditions and a
//! short hourly forecast, then normalizes the free-form reply (fence
//! stripping, strict parsing, citation extraction) into a displayable
//! result.

pub mod gemini;
pub mod normalize;
pub mod provider;
pub mod session;
pub mod types;

pub use gemini::GeminiClient;
pub use provider::WeatherProvider;
pub use session::{LookupSession, RequestToken};
pub use types::*;
