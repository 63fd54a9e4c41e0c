//! Tools to build gateways from configuration.

use crate::{FixtureScraper, HttpScraper, ScraperGateway, SetupError};
use playreviews_settings::{ScraperConfig, Settings};
use std::sync::Arc;

/// Build the gateway described by `settings.scraper`.
///
/// # Errors
/// If the configured gateway cannot be set up.
pub fn make_gateway(settings: &Settings) -> Result<Arc<dyn ScraperGateway>, SetupError> {
    let gateway: Box<dyn ScraperGateway> = match &settings.scraper {
        ScraperConfig::Http(http_config) => HttpScraper::new_boxed(http_config)?,
        ScraperConfig::Fixture(fixture_config) => {
            FixtureScraper::new_boxed(settings, fixture_config)?
        }
    };
    tracing::debug!(r#type = "scraper.setup", gateway = %gateway.name(), "Scraper gateway ready");
    Ok(Arc::from(gateway))
}

#[cfg(test)]
mod tests {
    use super::make_gateway;
    use playreviews_settings::{FixtureScraperConfig, ScraperConfig, Settings};

    #[test]
    fn http_gateway_from_test_settings() {
        let settings = Settings::load_for_tests(|_| ());
        let gateway = make_gateway(&settings).expect("http gateway builds");
        assert!(gateway.name().starts_with("HttpScraper("));
    }

    #[test]
    fn fixture_gateway_is_debug_only() {
        let settings = Settings::load_for_tests(|s| {
            s.debug = false;
            s.scraper = ScraperConfig::Fixture(FixtureScraperConfig {
                path: "fixture.json".into(),
            });
        });
        assert!(make_gateway(&settings).is_err());
    }
}
