//! Propcast Tools - outbound HTTP clients
//!
//! - fetch: image download with a fixed timeout
//! - gemini: Gemini `generateContent` client for image descriptions

pub mod fetch;
pub mod gemini;

pub use fetch::{FetchError, ImageFetcher, DOWNLOAD_TIMEOUT};
pub use gemini::{GeminiClient, GeminiError, GenerateContentResponse};
