//! Backend for a dental clinical-documentation service: patient search,
//! note generation from visit transcripts, templates and transcription.

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod identity;
pub mod model;
pub mod records;
pub mod sanitize;
pub mod speech;
pub mod store;
pub mod templates;

pub use error::{ScribeError, ScribeResult};
