//! Core types and trait definitions for the Pitchside match store.
//!
//! This crate is free of database and file-format dependencies. It owns the
//! canonical row types, the staging row types, the normalizer that turns the
//! latter into the former, and the [`store::MatchStore`] abstraction that
//! storage backends implement.

pub mod competition;
pub mod error;
pub mod event;
pub mod fixture;
pub mod lenient;
pub mod normalize;
pub mod player;
pub mod pseudo_json;
pub mod report;
pub mod roster;
pub mod store;
pub mod tracking;

pub use error::{Error, Result};
