//! Error reporting setup.

use playreviews_settings::Settings;
use sentry::{protocol::Event, ClientInitGuard, ClientOptions, Integration};

/// Start the Sentry client, unless `sentry.mode` is `disabled`.
///
/// Reporting stops when the returned guard is dropped, so `main` holds it.
pub fn init_sentry(settings: &Settings) -> Option<ClientInitGuard> {
    let debug = settings.sentry.debug();
    let dsn = settings.sentry.dsn();
    if dsn.is_none() && !debug {
        tracing::debug!(r#type = "sentry.disabled", "Not reporting errors to Sentry");
        return None;
    }

    let options = ClientOptions {
        dsn,
        debug,
        release: sentry::release_name!(),
        environment: Some(settings.env.clone().into()),
        ..Default::default()
    };
    let options = if debug {
        options.add_integration(LogSentEvents)
    } else {
        options
    };

    Some(sentry::init(sentry::apply_defaults(options)))
}

/// Logs a summary of every event handed to Sentry. Only added in debug mode.
struct LogSentEvents;

impl Integration for LogSentEvents {
    fn name(&self) -> &'static str {
        "playreviews-log-sent-events"
    }

    fn process_event(
        &self,
        event: Event<'static>,
        _options: &ClientOptions,
    ) -> Option<Event<'static>> {
        let errors: Vec<String> = event
            .exception
            .values
            .iter()
            .map(|exception| match &exception.value {
                Some(value) => format!("{}: {}", exception.ty, value),
                None => exception.ty.clone(),
            })
            .collect();

        tracing::debug!(
            r#type = "sentry.event",
            event_id = %event.event_id,
            transaction = event.transaction.as_deref().unwrap_or("none"),
            ?errors,
            "Sending event to Sentry"
        );

        Some(event)
    }
}
