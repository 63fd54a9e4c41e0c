#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Review aggregation for [Play Reviews](../playreviews/index.html).
//!
//! Raw reviews from a [`ScraperGateway`](playreviews_scraper::ScraperGateway)
//! come in many shapes. This crate turns them into [`CanonicalReview`]s,
//! merges the languages of a country into one list with no repeated reviews,
//! and applies the client's `date` cutoff. [`ReviewAggregator`] ties those
//! steps together for a request.

mod aggregate;
mod date_filter;
mod dedupe;
pub mod languages;
mod normalize;
mod review;
pub mod timestamp;

pub use crate::{
    aggregate::{AggregateError, ReviewAggregator, ReviewQuery},
    date_filter::{filter_since, parse_cutoff, parse_cutoff_at, DateParseError},
    dedupe::dedupe,
    languages::languages_for,
    normalize::{normalize, normalize_all},
    review::{sort_newest_first, CanonicalReview},
};
