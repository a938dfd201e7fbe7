use mongodb::bson::DateTime;
use rocket::form::FromFormField;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::text::contains_ci;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Feedback {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "bookingId", default)]
    pub booking_id: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime>,
}

impl Feedback {
    pub fn resolved_rating(&self) -> i32 {
        self.rating.unwrap_or(0)
    }
}

pub fn filter_feedback<'a>(
    feedback: &'a [Feedback],
    search: Option<&str>,
    rating: Option<i32>,
) -> Vec<&'a Feedback> {
    feedback
        .iter()
        .filter(|f| match search {
            Some(term) if !term.is_empty() => {
                contains_ci(f.review.as_deref(), term)
                    || contains_ci(f.user_id.as_deref(), term)
                    || contains_ci(f.driver_id.as_deref(), term)
                    || contains_ci(f.booking_id.as_deref(), term)
            }
            _ => true,
        })
        .filter(|f| match rating {
            Some(wanted) => f.rating == Some(wanted),
            None => true,
        })
        .collect()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, FromFormField, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSort {
    Newest,
    Oldest,
    RatingHigh,
    RatingLow,
}

pub fn sort_feedback(feedback: &mut [&Feedback], sort: FeedbackSort) {
    feedback.sort_by(|a, b| {
        let a_ts = a.created_at.map(|d| d.timestamp_millis()).unwrap_or(0);
        let b_ts = b.created_at.map(|d| d.timestamp_millis()).unwrap_or(0);
        match sort {
            FeedbackSort::Newest => b_ts.cmp(&a_ts),
            FeedbackSort::Oldest => a_ts.cmp(&b_ts),
            FeedbackSort::RatingHigh => b.resolved_rating().cmp(&a.resolved_rating()),
            FeedbackSort::RatingLow => a.resolved_rating().cmp(&b.resolved_rating()),
        }
    });
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FeedbackStats {
    pub total: u64,
    /// Mean rating over the full set, one decimal place.
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
    #[serde(rename = "ratingDistribution")]
    pub rating_distribution: BTreeMap<i32, u64>,
}

pub fn feedback_stats(feedback: &[Feedback]) -> FeedbackStats {
    let total = feedback.len() as u64;
    let sum: i64 = feedback.iter().map(|f| f.resolved_rating() as i64).sum();
    let average = if total > 0 {
        (sum as f64 / total as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    let mut distribution: BTreeMap<i32, u64> = (1..=5).map(|star| (star, 0)).collect();
    for f in feedback {
        if let Some(count) = distribution.get_mut(&f.resolved_rating()) {
            *count += 1;
        }
    }

    FeedbackStats {
        total,
        average_rating: average,
        rating_distribution: distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(id: &str, rating: i32) -> Feedback {
        Feedback {
            id: id.to_string(),
            booking_id: None,
            user_id: None,
            driver_id: None,
            rating: Some(rating),
            review: None,
            created_at: None,
        }
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let all = vec![feedback("a", 5), feedback("b", 4), feedback("c", 4)];
        let stats = feedback_stats(&all);
        assert_eq!(stats.average_rating, 4.3);
        assert_eq!(stats.total, 3);
    }

    #[test]
    fn empty_set_has_zero_average() {
        let stats = feedback_stats(&[]);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.rating_distribution.values().sum::<u64>(), 0);
    }

    #[test]
    fn distribution_covers_all_stars() {
        let all = vec![feedback("a", 5), feedback("b", 5), feedback("c", 1)];
        let stats = feedback_stats(&all);
        assert_eq!(stats.rating_distribution[&5], 2);
        assert_eq!(stats.rating_distribution[&1], 1);
        assert_eq!(stats.rating_distribution[&3], 0);
    }

    #[test]
    fn rating_filter_is_exact() {
        let all = vec![feedback("a", 5), feedback("b", 4)];
        let view = filter_feedback(&all, None, Some(5));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "a");
    }

    #[test]
    fn search_spans_review_and_references() {
        let mut a = feedback("a", 5);
        a.review = Some("Great driver".to_string());
        let mut b = feedback("b", 3);
        b.driver_id = Some("driver-42".to_string());
        let all = vec![a, b];

        assert_eq!(filter_feedback(&all, Some("great"), None).len(), 1);
        assert_eq!(filter_feedback(&all, Some("driver-42"), None).len(), 1);
        assert_eq!(filter_feedback(&all, Some(""), None).len(), 2);
    }

    #[test]
    fn sort_deserializes_from_wire() {
        let sort: FeedbackSort = serde_json::from_str("\"ratinghigh\"").unwrap();
        assert_eq!(sort, FeedbackSort::RatingHigh);
    }

    #[test]
    fn rating_sorts_run_both_directions() {
        let all = vec![feedback("a", 2), feedback("b", 5)];
        let mut view: Vec<&Feedback> = all.iter().collect();

        sort_feedback(&mut view, FeedbackSort::RatingHigh);
        assert_eq!(view[0].id, "b");
        sort_feedback(&mut view, FeedbackSort::RatingLow);
        assert_eq!(view[0].id, "a");
    }
}
