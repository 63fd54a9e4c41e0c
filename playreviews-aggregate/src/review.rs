use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A review in the one shape the service hands out, whatever shape the
/// scraper returned it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReview {
    /// Unique within one response. Taken from the store when it has one.
    pub id: String,

    /// The reviewer's display name.
    pub user_name: String,

    /// The reviewer's avatar.
    pub user_image: Option<String>,

    /// When the review was written.
    #[serde(with = "timestamp::iso_millis")]
    pub date: DateTime<Utc>,

    /// Star rating, 1 to 5.
    pub score: u8,

    /// `score` as a decimal string.
    pub score_text: String,

    /// Link to the review on the store.
    pub url: String,

    /// The review's headline, which most reviews don't have.
    pub title: Option<String>,

    /// The body of the review.
    pub text: String,

    /// When the developer replied, as ISO-8601 when the store gave a date.
    pub reply_date: Option<String>,

    /// The developer's reply.
    pub reply_text: Option<String>,

    /// The app version the review was written against.
    pub version: String,

    /// Engagement counters. Each is only ever read from its own store field,
    /// and is `None` when the store didn't report it.
    pub thumbs_up: Option<u64>,
    /// See `thumbs_up`.
    pub likes: Option<u64>,
    /// See `thumbs_up`.
    pub helpful: Option<u64>,
    /// See `thumbs_up`.
    pub positive: Option<u64>,
    /// See `thumbs_up`.
    pub thumbs_down: Option<u64>,
    /// See `thumbs_up`.
    pub dislikes: Option<u64>,
    /// See `thumbs_up`.
    pub unhelpful: Option<u64>,
    /// See `thumbs_up`.
    pub negative: Option<u64>,

    /// Free-form tags attached to the review.
    pub criterias: Vec<String>,
}

/// Order reviews newest first. Reviews with the same date keep their order.
pub fn sort_newest_first(reviews: &mut [CanonicalReview]) {
    reviews.sort_by(|a, b| b.date.cmp(&a.date));
}
