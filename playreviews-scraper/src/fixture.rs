//! A gateway that serves canned store data from a JSON file.
//!
//! It is meant to be used in development and testing.

use crate::{
    AppInfoRequest, RawReview, ReviewsRequest, ScraperError, ScraperGateway, SearchRequest,
    SetupError, SuggestRequest,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use playreviews_settings::{FixtureScraperConfig, Settings};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// The language key that matches any language.
const ANY_LANGUAGE: &str = "*";

/// The contents of a fixture file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FixtureData {
    /// Reviews by app id, then by language code or `*`.
    pub reviews: HashMap<String, HashMap<String, Vec<Value>>>,
    /// Store listings by app id.
    pub apps: HashMap<String, Value>,
    /// Apps returned for any search, filtered by title.
    pub search: Vec<Value>,
    /// Suggestions returned for any partial term that they contain.
    pub suggestions: Vec<String>,
}

/// A gateway that always answers from the same data.
pub struct FixtureScraper {
    /// The canned data.
    data: FixtureData,
}

impl FixtureScraper {
    /// Load the fixture file named in `config`.
    ///
    /// # Errors
    /// If `debug` is off, or the file cannot be read or parsed.
    pub fn new_boxed(
        settings: &Settings,
        config: &FixtureScraperConfig,
    ) -> Result<Box<Self>, SetupError> {
        if !settings.debug {
            return Err(SetupError::InvalidConfiguration(anyhow!(
                "FixtureScraper can only be used in debug mode",
            )));
        }

        let contents = std::fs::read_to_string(&config.path)
            .with_context(|| format!("reading fixture {}", config.path.display()))
            .map_err(SetupError::Io)?;
        let data = serde_json::from_str(&contents)
            .with_context(|| format!("parsing fixture {}", config.path.display()))
            .map_err(SetupError::Format)?;

        Ok(Box::new(Self::from_data(data)))
    }

    /// Serve `data` directly.
    pub fn from_data(data: FixtureData) -> Self {
        Self { data }
    }

    /// Whether the fixture knows about an app at all.
    fn knows_app(&self, app_id: &str) -> bool {
        self.data.reviews.contains_key(app_id) || self.data.apps.contains_key(app_id)
    }
}

#[async_trait]
impl ScraperGateway for FixtureScraper {
    fn name(&self) -> String {
        "FixtureScraper".to_string()
    }

    async fn reviews(&self, request: &ReviewsRequest) -> Result<Vec<RawReview>, ScraperError> {
        if !self.knows_app(&request.app_id) {
            return Err(ScraperError::AppNotFound);
        }

        let by_language = match self.data.reviews.get(&request.app_id) {
            Some(by_language) => by_language,
            None => return Ok(Vec::new()),
        };
        let items = by_language
            .get(&request.language)
            .or_else(|| by_language.get(ANY_LANGUAGE));

        Ok(items
            .into_iter()
            .flatten()
            .filter(|item| item.is_object())
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .take(request.page_size)
            .collect())
    }

    async fn app_info(&self, request: &AppInfoRequest) -> Result<Value, ScraperError> {
        self.data
            .apps
            .get(&request.app_id)
            .cloned()
            .ok_or(ScraperError::AppNotFound)
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Value>, ScraperError> {
        let term = request.term.to_lowercase();
        Ok(self
            .data
            .search
            .iter()
            .filter(|app| {
                app.get("title")
                    .and_then(Value::as_str)
                    .map_or(false, |title| title.to_lowercase().contains(&term))
            })
            .take(request.limit)
            .cloned()
            .collect())
    }

    async fn suggest(&self, request: &SuggestRequest) -> Result<Vec<String>, ScraperError> {
        let term = request.term.to_lowercase();
        Ok(self
            .data
            .suggestions
            .iter()
            .filter(|suggestion| suggestion.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }
}
