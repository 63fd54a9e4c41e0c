//! # Developer documentation for working on Play Reviews
//!
//! ## tl;dr
//!
//! Run the service
//! ```shell
//! $ cargo run -p playreviews
//! ```
//!
//! Run the tests of one crate
//! ```shell
//! $ cargo test -p playreviews-aggregate
//! ```
//!
//! ## The scraper
//!
//! The store is read through a scraper service reached at
//! `scraper.base_url`. For work that doesn't need real store data, switch to
//! the fixture gateway, which is only allowed when `debug` is on:
//!
//! ```yaml
//! # config/local.yaml
//! scraper:
//!   type: fixture
//!   path: ./fixtures/reviews.json
//! ```
//!
//! The fixture file has `reviews` (by app id, then language or `*`), `apps`,
//! `search` and `suggestions` members.
//!
//! ## Local configuration
//!
//! The default environment is `development`, which has human-oriented logging
//! and debugging enabled. Settings are read from `config/base.yaml`, then
//! `config/development.yaml`, then `config/local.yaml` (not checked in), then
//! from environment variables such as `PLAYREVIEWS_HTTP__LISTEN=0.0.0.0:3000`.
//!
//! > For full details, make sure to check out the documentation for
//! > `playreviews_settings`.
//!
//! Secrets, such as Sentry DSNs, belong in `config/local.yaml` or the
//! environment, never in the checked in files.
