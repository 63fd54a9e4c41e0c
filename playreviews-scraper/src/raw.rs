//! Reviews as the scraper hands them over.

use fake::{
    faker::{lorem::en::Words, name::en::Name},
    Fake,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One review, unmodified from the store scraper.
///
/// Different scraper versions and calls populate different subsets of these
/// fields, and the same field may arrive as a string, a number, or an object.
/// Every field is therefore kept as loose JSON. A JSON `null` is treated the
/// same as a missing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct RawReview {
    pub review_id: Option<Value>,
    pub id: Option<Value>,

    pub user_name: Option<Value>,
    pub author: Option<Value>,
    pub user_image: Option<Value>,
    pub profile_image: Option<Value>,

    pub date: Option<Value>,
    pub time: Option<Value>,
    pub timestamp: Option<Value>,

    pub score: Option<Value>,
    pub rating: Option<Value>,
    pub stars: Option<Value>,

    pub title: Option<Value>,
    pub headline: Option<Value>,
    pub text: Option<Value>,
    pub body: Option<Value>,
    pub content: Option<Value>,
    pub comment: Option<Value>,

    pub reply_date: Option<Value>,
    pub reply_text: Option<Value>,
    /// A nested `{date, text}` reply, used by some scraper versions instead of
    /// `replyDate` and `replyText`.
    pub reply: Option<Value>,

    pub app_version: Option<Value>,
    pub version: Option<Value>,
    #[serde(rename = "app_version")]
    pub app_version_snake: Option<Value>,

    pub thumbs_up: Option<Value>,
    pub likes: Option<Value>,
    pub helpful: Option<Value>,
    pub positive: Option<Value>,
    pub thumbs_down: Option<Value>,
    pub dislikes: Option<Value>,
    pub unhelpful: Option<Value>,
    pub negative: Option<Value>,

    pub criterias: Option<Value>,
    pub criteria: Option<Value>,
    pub tags: Option<Value>,
}

impl RawReview {
    /// Whether a loose JSON item has any of the fields that mark it as a
    /// review rather than some other list the scraper returned.
    pub(crate) fn looks_like_review(item: &Value) -> bool {
        ["text", "score", "userName", "body"]
            .iter()
            .any(|key| item.get(key).map_or(false, is_truthy))
    }
}

/// Loose truthiness, so that empty strings and zeros don't count as present.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl<F> fake::Dummy<F> for RawReview {
    fn dummy_with_rng<R: rand::Rng + ?Sized>(_config: &F, rng: &mut R) -> Self {
        let id: String = std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
            .take(24)
            .map(char::from)
            .collect();
        Self {
            review_id: Some(json!(format!("gp:{}", id))),
            user_name: Some(json!(Name().fake_with_rng::<String, R>(rng))),
            date: Some(json!(format!(
                "2024-{:02}-{:02}T{:02}:{:02}:00.000Z",
                rng.gen_range(1..=12),
                rng.gen_range(1..=28),
                rng.gen_range(0..24),
                rng.gen_range(0..60),
            ))),
            score: Some(json!(rng.gen_range(1..=5))),
            text: Some(json!(Words(3..20)
                .fake_with_rng::<Vec<String>, R>(rng)
                .join(" "))),
            app_version: Some(json!(format!(
                "{}.{}.{}",
                rng.gen_range(1..10),
                rng.gen_range(0..20),
                rng.gen_range(0..100)
            ))),
            thumbs_up: Some(json!(rng.gen_range(0..500))),
            ..Self::default()
        }
    }
}
