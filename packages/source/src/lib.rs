#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The seam between the crawl and wherever activity comes from.
//!
//! A source answers one page request at a time. Pagination, retries and
//! politeness belong to the fetcher, parsing belongs to the parser.

mod provider;

pub use ghactivity_source_models::{Feed, Page, PageRequest, SourceError};
pub use provider::ActivitySource;
