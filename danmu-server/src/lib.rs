//! Danmu aggregation server.
//!
//! Resolves a title to its watch pages on several streaming platforms, pulls
//! time-coded comments for each through a tiered provider chain, and serves
//! the merged feed over HTTP.

pub mod api;
pub mod config;
pub mod danmu;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
