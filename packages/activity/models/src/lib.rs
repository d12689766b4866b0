#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Activity models for `ghactivity`.
//!
//! This crate defines the typed records produced by a crawl and the immutable
//! configuration a crawl runs with.

pub mod config;
pub mod record;
pub mod window;

pub use config::{ConfigError, CrawlConfig, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use record::{Record, RecordKind};
pub use window::TimeWindow;
