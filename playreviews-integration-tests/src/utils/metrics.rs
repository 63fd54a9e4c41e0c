//! Capturing the metrics a server under test sends.

use cadence::{SpyMetricSink, StatsdClient};
use crossbeam_channel::Receiver;
use statsd_parser::{Message, Metric};

/// Collects what a [`StatsdClient`] sends, parsed back into statsd messages.
///
/// The client is created with no prefix, so names are compared as the code
/// under test writes them, such as `reviews.fetch`.
pub struct MetricsWatcher {
    /// Raw lines from the spy sink.
    incoming: Receiver<Vec<u8>>,

    /// Everything parsed so far, in the order it was sent.
    seen: Vec<Message>,
}

impl MetricsWatcher {
    /// A watcher, and the client whose metrics it sees.
    pub fn new_with_client() -> (Self, StatsdClient) {
        let (incoming, sink) = SpyMetricSink::new();
        let watcher = Self {
            incoming,
            seen: Vec::new(),
        };
        (watcher, StatsdClient::from_sink("", sink))
    }

    /// Every message received, oldest first.
    pub fn all_messages(&mut self) -> &[Message] {
        for line in self.incoming.try_iter() {
            let line = String::from_utf8(line).expect("metric lines are UTF-8");
            let message = statsd_parser::parse(&line)
                .unwrap_or_else(|error| panic!("could not parse metric {:?}: {:?}", line, error));
            self.seen.push(message);
        }
        &self.seen
    }

    /// Whether any message received matches `predicate`.
    ///
    /// ```
    /// # use playreviews_integration_tests::MetricsWatcher;
    /// use cadence::CountedExt;
    ///
    /// let (mut watcher, client) = MetricsWatcher::new_with_client();
    /// client.incr("reviews.fetch").unwrap();
    /// assert!(watcher.has(|message| message.name == "reviews.fetch"));
    /// ```
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&Message) -> bool,
    {
        self.all_messages().iter().any(predicate)
    }

    /// Whether a counter called `name` was sent.
    pub fn has_counter(&mut self, name: &str) -> bool {
        self.has(|message| message.name == name && matches!(message.metric, Metric::Counter(_)))
    }

    /// The values of every histogram called `name`.
    pub fn histogram_values(&mut self, name: &str) -> Vec<f64> {
        self.all_messages()
            .iter()
            .filter(|message| message.name == name)
            .filter_map(|message| match &message.metric {
                Metric::Histogram(histogram) => Some(histogram.value),
                _ => None,
            })
            .collect()
    }

    /// Whether a histogram called `name` was sent with `expected`, give or
    /// take float rounding.
    pub fn has_histogram(&mut self, name: &str, expected: f64) -> bool {
        self.histogram_values(name)
            .iter()
            .any(|value| (value - expected).abs() <= 0.0001)
    }
}
