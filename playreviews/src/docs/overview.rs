//! # High level overview of Play Reviews
//!
//! This project is a [Cargo Workspace][] with one crate for each broad area of
//! behavior. Each crate can be built and tested on its own or together with
//! the others.
//!
//! [Cargo Workspace]: https://doc.rust-lang.org/book/ch14-03-cargo-workspaces.html
//!
//! ## [`playreviews`](../)
//!
//! The service binary. It loads settings, sets up logging, Sentry and
//! metrics, and starts the web server.
//!
//! ## [`playreviews-settings`](../../playreviews_settings/index.html)
//!
//! Defines and documents the settings of the application. Settings are loaded
//! by the binary and passed into the other crates to configure them.
//!
//! ## [`playreviews-scraper`](../../playreviews_scraper/index.html)
//!
//! Access to store data. The store is scraped by a separate component reached
//! over HTTP; this crate wraps it behind the `ScraperGateway` trait, with
//! retries for transient failures, and provides a fixture gateway for local
//! development.
//!
//! ## [`playreviews-aggregate`](../../playreviews_aggregate/index.html)
//!
//! Turns raw reviews into one canonical shape, merges the languages of a
//! country without duplicates, and applies date cutoffs.
//!
//! ## [`playreviews-web`](../../playreviews_web/index.html)
//!
//! The HTTP API, built with actix-web. Handlers validate query parameters,
//! call into the aggregator or the scraper, and wrap results in the response
//! envelope.
//!
//! ## [`playreviews-integration-tests`](../../playreviews_integration_tests/index.html)
//!
//! Black box tests that run the whole server against a mocked scraper.
