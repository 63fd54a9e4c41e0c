//! Turning raw scraper reviews into [`CanonicalReview`]s.
//!
//! Every output field is read from a fixed, ordered list of raw field names.
//! The first candidate holding a usable value wins. Nulls, blank strings and
//! values of the wrong type are skipped as if the field were missing.

use crate::{timestamp, CanonicalReview};
use chrono::Utc;
use playreviews_scraper::RawReview;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Store listing that review links are built on.
const STORE_DETAILS_URL: &str = "https://play.google.com/store/apps/details";

/// Normalize a whole batch. `index` of each review is its position in `raws`.
pub fn normalize_all(raws: &[RawReview], app_id: &str) -> Vec<CanonicalReview> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| normalize(raw, index, app_id))
        .collect()
}

/// Normalize one review of `app_id`, found at position `index` of its batch.
pub fn normalize(raw: &RawReview, index: usize, app_id: &str) -> CanonicalReview {
    let id = first_text(&[&raw.review_id, &raw.id]).unwrap_or_else(|| synthetic_id(index));
    let score = first_number(&[&raw.score, &raw.rating, &raw.stars])
        .map_or(3, |score| score.round().clamp(1.0, 5.0) as u8);
    let reply = raw.reply.as_ref();

    CanonicalReview {
        url: review_url(app_id, &id),
        id,
        user_name: first_text(&[&raw.user_name, &raw.author])
            .unwrap_or_else(|| "Anonymous User".to_string()),
        user_image: first_text(&[&raw.user_image, &raw.profile_image]),
        date: [&raw.date, &raw.time, &raw.timestamp]
            .into_iter()
            .find_map(|candidate| candidate.as_ref().and_then(timestamp::from_value))
            .unwrap_or_else(Utc::now),
        score,
        score_text: score.to_string(),
        title: first_text(&[&raw.title, &raw.headline]),
        text: first_text(&[&raw.text, &raw.body, &raw.content, &raw.comment])
            .unwrap_or_else(|| "No review text available".to_string()),
        reply_date: [raw.reply_date.as_ref(), reply.and_then(|r| r.get("date"))]
            .into_iter()
            .flatten()
            .find_map(reply_date),
        reply_text: [raw.reply_text.as_ref(), reply.and_then(|r| r.get("text"))]
            .into_iter()
            .flatten()
            .find_map(text),
        version: first_text(&[&raw.app_version, &raw.version, &raw.app_version_snake])
            .unwrap_or_else(|| "Unknown".to_string()),
        thumbs_up: counter(&raw.thumbs_up),
        likes: counter(&raw.likes),
        helpful: counter(&raw.helpful),
        positive: counter(&raw.positive),
        thumbs_down: counter(&raw.thumbs_down),
        dislikes: counter(&raw.dislikes),
        unhelpful: counter(&raw.unhelpful),
        negative: counter(&raw.negative),
        criterias: [&raw.criterias, &raw.criteria, &raw.tags]
            .into_iter()
            .find_map(|candidate| match candidate {
                Some(Value::Array(items)) => Some(tags(items)),
                _ => None,
            })
            .unwrap_or_default(),
    }
}

/// A value usable as text. Numbers are written out in decimal.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The first candidate usable as text.
fn first_text(candidates: &[&Option<Value>]) -> Option<String> {
    candidates
        .iter()
        .copied()
        .find_map(|candidate| candidate.as_ref().and_then(text))
}

/// A value usable as a finite number, including numeric strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// The first candidate usable as a number.
fn first_number(candidates: &[&Option<Value>]) -> Option<f64> {
    candidates
        .iter()
        .copied()
        .find_map(|candidate| candidate.as_ref().and_then(number))
}

/// An engagement count. Negative counts become zero.
fn counter(value: &Option<Value>) -> Option<u64> {
    value
        .as_ref()
        .and_then(number)
        .map(|n| n.max(0.0).round() as u64)
}

/// Reply dates are rewritten as ISO-8601 when they can be read, and passed
/// through as text otherwise.
fn reply_date(value: &Value) -> Option<String> {
    timestamp::from_value(value)
        .map(|instant| timestamp::format(&instant))
        .or_else(|| text(value))
}

/// Trimmed, non-blank string tags. Anything else is dropped.
fn tags(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// An id for a review the store didn't give one. Unique within a batch
/// through `index`, and very likely unique across batches.
fn synthetic_id(index: usize) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("gp-{}-{}-{}", index, nanos, suffix)
}

/// Link to a review on the store.
fn review_url(app_id: &str, review_id: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("id", app_id)
        .append_pair("reviewId", review_id)
        .finish();
    format!("{}?{}", STORE_DETAILS_URL, query)
}
