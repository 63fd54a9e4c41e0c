//! Query parameters of the API, and the checks applied to them.
//!
//! Parameters are deserialized as loose strings so that every problem can be
//! reported in the API's own error format.

use crate::errors::HandlerError;
use serde::Deserialize;

/// The default number of apps returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// The largest number of apps a search may ask for.
pub const MAX_SEARCH_LIMIT: usize = 250;

/// Parameters of `GET /app`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewParams {
    /// The package name of the app.
    pub appid: Option<String>,
    /// Store country.
    pub country: Option<String>,
    /// A single review language.
    pub lang: Option<String>,
    /// Cutoff expression for old reviews.
    pub date: Option<String>,
}

/// Parameters of `GET /app/info`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppInfoParams {
    /// The package name of the app.
    pub appid: Option<String>,
    /// Store country.
    pub country: Option<String>,
    /// Listing language.
    pub lang: Option<String>,
}

/// Parameters of `GET /app/search` and `GET /app/suggestions`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// The search terms.
    pub q: Option<String>,
    /// The maximum number of results. Ignored by suggestions.
    pub limit: Option<String>,
    /// Store country.
    pub country: Option<String>,
    /// Listing language.
    pub lang: Option<String>,
}

/// A value that is present and not blank.
fn given(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check an app's package name, such as `com.whatsapp`.
///
/// # Errors
/// If `appid` is missing or not a dotted package name.
pub fn app_id(value: Option<&str>) -> Result<String, HandlerError> {
    let app_id = given(value).ok_or_else(|| HandlerError::missing("appid"))?;

    let mut segments = 0;
    for segment in app_id.split('.') {
        let mut chars = segment.chars();
        let starts_with_letter = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
        if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(HandlerError::invalid("appid"));
        }
        segments += 1;
    }
    if segments < 2 {
        return Err(HandlerError::invalid("appid"));
    }

    Ok(app_id.to_string())
}

/// Check a country code, returning it upper-cased, or `None` if not given.
///
/// # Errors
/// If the country is not two ASCII letters.
pub fn optional_country(value: Option<&str>) -> Result<Option<String>, HandlerError> {
    match given(value) {
        None => Ok(None),
        Some(country) if country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(Some(country.to_ascii_uppercase()))
        }
        Some(_) => Err(HandlerError::invalid("country")),
    }
}

/// Check a country code, falling back to `default` when not given.
///
/// # Errors
/// If the country is not two ASCII letters.
pub fn country(value: Option<&str>, default: &str) -> Result<String, HandlerError> {
    Ok(optional_country(value)?.unwrap_or_else(|| default.to_ascii_uppercase()))
}

/// Check a language code, returning it lower-cased, or `None` if not given.
///
/// # Errors
/// If the language is too long or has characters other than letters, `-` and
/// `_`.
pub fn language(value: Option<&str>) -> Result<Option<String>, HandlerError> {
    match given(value) {
        None => Ok(None),
        Some(lang)
            if lang.len() <= 10
                && lang
                    .chars()
                    .all(|c| c.is_ascii_alphabetic() || c == '-' || c == '_') =>
        {
            Ok(Some(lang.to_ascii_lowercase()))
        }
        Some(_) => Err(HandlerError::invalid("lang")),
    }
}

/// Check the search terms.
///
/// # Errors
/// If `q` is missing or blank.
pub fn term(value: Option<&str>) -> Result<String, HandlerError> {
    given(value)
        .map(ToString::to_string)
        .ok_or_else(|| HandlerError::missing("q"))
}

/// Check a search limit.
///
/// # Errors
/// If the limit is not a whole number from 1 to [`MAX_SEARCH_LIMIT`].
pub fn limit(value: Option<&str>) -> Result<usize, HandlerError> {
    match given(value) {
        None => Ok(DEFAULT_SEARCH_LIMIT),
        Some(limit) => limit
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_SEARCH_LIMIT).contains(n))
            .ok_or_else(|| HandlerError::invalid("limit")),
    }
}

#[cfg(test)]
mod tests {
    use super::{app_id, country, language, limit, optional_country, term};
    use pretty_assertions::assert_eq;

    fn message<T: std::fmt::Debug>(result: Result<T, crate::errors::HandlerError>) -> String {
        result.expect_err("should be rejected").to_string()
    }

    #[test]
    fn app_ids() {
        assert_eq!(app_id(Some("com.whatsapp")).unwrap(), "com.whatsapp");
        assert_eq!(app_id(Some(" com.Example.app_2 ")).unwrap(), "com.Example.app_2");

        assert_eq!(message(app_id(None)), "Missing required parameter: appid");
        assert_eq!(message(app_id(Some("  "))), "Missing required parameter: appid");
        for bad in ["whatsapp", "com.", ".com", "com..app", "com.1app", "com.what's", "com/app"] {
            assert_eq!(message(app_id(Some(bad))), "Invalid parameter: appid", "{bad}");
        }
    }

    #[test]
    fn countries() {
        assert_eq!(country(None, "US").unwrap(), "US");
        assert_eq!(country(Some(""), "gb").unwrap(), "GB");
        assert_eq!(country(Some("br"), "US").unwrap(), "BR");
        assert_eq!(optional_country(None).unwrap(), None);
        for bad in ["USA", "u", "1a", "ü."] {
            assert_eq!(message(country(Some(bad), "US")), "Invalid parameter: country", "{bad}");
        }
    }

    #[test]
    fn languages() {
        assert_eq!(language(None).unwrap(), None);
        assert_eq!(language(Some(" ")).unwrap(), None);
        assert_eq!(language(Some("EN")).unwrap(), Some("en".to_string()));
        assert_eq!(language(Some("pt-BR")).unwrap(), Some("pt-br".to_string()));
        assert_eq!(message(language(Some("en;drop"))), "Invalid parameter: lang");
        assert_eq!(message(language(Some("abcdefghijk"))), "Invalid parameter: lang");
    }

    #[test]
    fn search_terms_and_limits() {
        assert_eq!(term(Some(" chat ")).unwrap(), "chat");
        assert_eq!(message(term(Some(""))), "Missing required parameter: q");
        assert_eq!(limit(None).unwrap(), 20);
        assert_eq!(limit(Some("250")).unwrap(), 250);
        for bad in ["0", "251", "-1", "ten", "2.5"] {
            assert_eq!(message(limit(Some(bad))), "Invalid parameter: limit", "{bad}");
        }
    }
}
