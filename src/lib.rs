//! Scrubber: web search without API keys.
//!
//! This crate is the application shell around [`scrubber_search`]:
//! query → engine result pages → sanitised candidates → ranked results →
//! captured documents
//!
//! # Architecture
//!
//! - **Config**: one TOML file holding the search settings and document
//!   capture limits
//! - **Session**: a [`Scrubber`] owns one crawl orchestrator, runs the
//!   ranked search and then fetches the best results as readable documents
//! - **CLI**: the `scrubber` binary drives sessions and offline reranking

pub mod config;
pub mod error;
pub mod session;

pub use config::{DocumentConfig, ScrubberConfig};
pub use error::{Result, ScrubberError};
pub use session::{Report, Scrubber};
