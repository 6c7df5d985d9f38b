//! External text generator: request payloads, HTTP client and response parsing

pub mod client;
pub mod context;
pub mod parser;

pub use client::{ApiFormat, GeneratorClient, TextGenerator};
pub use context::{GenerationRequest, GeneratorRequest, InterpretRequest, RequestMode};
