//! Source-format decoders and the ingest [`Pipeline`].
//!
//! Each loader reads one kind of source file (staging CSV, match metadata,
//! roster, event, or tracking JSON), turns it into a load batch, and hands it
//! to any [`pitchside_core::store::MatchStore`]. The pipeline owns no storage.

pub mod config;
pub mod error;
pub mod events;
pub mod metadata;
pub mod pipeline;
pub mod roster;
pub mod source;
pub mod staging;
pub mod tracking;

pub use config::{BallSource, IngestConfig, TrackingConfig};
pub use error::{Error, Result};
pub use pipeline::Pipeline;

#[cfg(test)]
mod tests;
