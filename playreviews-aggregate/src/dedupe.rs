//! Removing reviews that were returned more than once.

use crate::CanonicalReview;
use std::collections::HashSet;

/// Keep the first review with each id, in their original order.
pub fn dedupe(reviews: Vec<CanonicalReview>) -> Vec<CanonicalReview> {
    let mut seen = HashSet::with_capacity(reviews.len());
    reviews
        .into_iter()
        .filter(|review| seen.insert(review.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::dedupe;
    use crate::normalize::normalize;
    use crate::CanonicalReview;
    use playreviews_scraper::RawReview;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn review(id: &str, text: &str) -> CanonicalReview {
        let raw: RawReview = serde_json::from_value(json!({ "reviewId": id, "text": text }))
            .expect("valid raw review");
        normalize(&raw, 0, "com.example.app")
    }

    fn ids(reviews: &[CanonicalReview]) -> Vec<&str> {
        reviews.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn first_occurrence_wins() {
        let reviews = vec![review("a", "first"), review("b", "second"), review("a", "third")];
        let deduped = dedupe(reviews);
        assert_eq!(ids(&deduped), vec!["a", "b"]);
        assert_eq!(deduped[0].text, "first");
    }

    #[test]
    fn dedupe_is_idempotent() {
        let reviews = vec![
            review("c", "1"),
            review("a", "2"),
            review("c", "3"),
            review("b", "4"),
            review("a", "5"),
        ];
        let once = dedupe(reviews);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec!["c", "a", "b"]);
    }

    #[test]
    fn empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
