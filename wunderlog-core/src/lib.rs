//! Core library for the `wunderlog` collector.
//!
//! This crate defines:
//! - The Weather Underground API client and its response cache
//! - File naming and the existence checks that keep downloads from repeating
//! - The collector that writes daily summaries, observations and forecast
//!   snapshots under a per-location directory
//! - Configuration & credentials handling
//!
//! It is used by `wunderlog-cli`, but can also be driven directly.

pub mod api;
pub mod cache;
pub mod collector;
pub mod config;
pub mod credentials;
pub mod error;
pub mod forecast;
pub mod format;
pub mod storage;

pub use api::ApiClient;
pub use cache::{FileCache, NoCache, ResponseCache};
pub use collector::{DEFAULT_HISTORY_DAYS, FetchOutcome, Wunderlog, WunderlogOptions};
pub use config::Config;
pub use error::{Result, WunderlogError};
pub use forecast::ForecastKind;
