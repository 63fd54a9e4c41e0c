use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::{filter::Directive, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directives, such as `INFO` or `playreviews_scraper=DEBUG`.
    ///
    /// Accepts a list or one comma separated string, so that
    /// `PLAYREVIEWS_LOGGING__LEVELS` can replace the list from the config
    /// files. Directives in `RUST_LOG` are appended last and win.
    ///
    /// ```yaml
    /// # config/local.yaml
    /// logging:
    ///   levels:
    ///     - INFO
    ///     - playreviews_aggregate=DEBUG   # see every fan-out language
    ///     - reqwest=WARN
    /// ```
    pub levels: LogDirectives,

    /// How events are written out.
    pub format: LogFormat,
}

/// Output formats for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, colored output for reading in a terminal.
    Pretty,

    /// One JSON object per line, for log collectors.
    Json,

    /// One plain line per event.
    Compact,
}

/// Checked filter directives, kept as strings since
/// [`Directive`] is neither `Clone` nor serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DirectiveInput", into = "Vec<String>")]
pub struct LogDirectives(Vec<String>);

/// The shapes directives can be written in.
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectiveInput {
    /// `"INFO,playreviews_web=DEBUG"`, as environment variables give them.
    Joined(String),
    /// `["INFO", "playreviews_web=DEBUG"]`, as config files give them.
    Listed(Vec<String>),
}

impl TryFrom<DirectiveInput> for LogDirectives {
    type Error = anyhow::Error;

    fn try_from(input: DirectiveInput) -> Result<Self, Self::Error> {
        let mut directives = match input {
            DirectiveInput::Joined(joined) => joined.parse()?,
            DirectiveInput::Listed(entries) => {
                let mut directives = Self(Vec::new());
                for entry in entries {
                    directives.extend(entry.parse()?);
                }
                directives
            }
        };

        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            directives.extend(rust_log.parse().context("RUST_LOG")?);
        }

        Ok(directives)
    }
}

impl From<LogDirectives> for Vec<String> {
    fn from(directives: LogDirectives) -> Self {
        directives.0
    }
}

impl FromStr for LogDirectives {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut directives = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            // Targets are crate names, which use underscores.
            if part.contains('-') {
                bail!("log targets must not include hyphens: {:?}", part);
            }
            part.parse::<Directive>()
                .with_context(|| format!("invalid log directive {:?}", part))?;
            directives.push(part.to_string());
        }
        Ok(Self(directives))
    }
}

impl LogDirectives {
    /// Append `other`, so its directives take precedence.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }
}

impl From<&LogDirectives> for EnvFilter {
    fn from(directives: &LogDirectives) -> Self {
        directives
            .0
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::default(), EnvFilter::add_directive)
    }
}

#[cfg(test)]
mod tests {
    use super::{LogDirectives, LogFormat};
    use parameterized::parameterized;

    #[parameterized(input = {
        "INFO",
        "INFO,playreviews_web=DEBUG",
        "WARN, reqwest=ERROR",
    })]
    fn valid_directives_parse(input: &str) {
        assert!(input.parse::<LogDirectives>().is_ok());
    }

    #[test]
    fn hyphenated_targets_are_rejected() {
        let err = "INFO,playreviews-web=DEBUG"
            .parse::<LogDirectives>()
            .unwrap_err();
        assert!(err.to_string().contains("hyphens"));
    }

    #[test]
    fn lists_and_strings_read_the_same() {
        let listed: LogDirectives =
            serde_json::from_str(r#"["INFO", "playreviews_scraper=DEBUG,reqwest=WARN"]"#)
                .expect("valid directives");
        let joined: LogDirectives =
            serde_json::from_str(r#""INFO,playreviews_scraper=DEBUG,reqwest=WARN""#)
                .expect("valid directives");
        assert_eq!(listed, joined);
        assert!(serde_json::from_str::<LogDirectives>(r#"["INFO", "a-b=WARN"]"#).is_err());
    }

    #[test]
    fn directives_serialize_as_a_list() {
        let directives: LogDirectives = "INFO,playreviews_web=DEBUG".parse().unwrap();
        assert_eq!(
            serde_json::to_value(&directives).unwrap(),
            serde_json::json!(["INFO", "playreviews_web=DEBUG"])
        );
    }

    #[test]
    fn log_format_names() {
        let format: LogFormat = serde_json::from_str(r#""json""#).expect("known format");
        assert_eq!(format, LogFormat::Json);
        assert!(serde_json::from_str::<LogFormat>(r#""mozlog""#).is_err());
    }
}
