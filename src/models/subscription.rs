use mongodb::bson::DateTime;
use rocket::form::FromFormField;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::bson::f64_or_string;
use crate::utils::text::contains_ci;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum SubscriptionStatus {
    Test,
    Active,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Test => "Test",
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Expired => "Expired",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(rename = "planCode", default)]
    pub plan_code: Option<String>,
    #[serde(default, deserialize_with = "f64_or_string")]
    pub price: Option<f64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<DateTime>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<DateTime>,
    #[serde(rename = "isDummy", default)]
    pub is_dummy: bool,
}

impl Subscription {
    /// Active only while the end date is strictly in the future; no end
    /// date means never active. The dummy flag overrides both outcomes.
    pub fn status_at(&self, now: DateTime) -> SubscriptionStatus {
        if self.is_dummy {
            return SubscriptionStatus::Test;
        }
        match self.end_date {
            Some(end) if end.timestamp_millis() > now.timestamp_millis() => {
                SubscriptionStatus::Active
            }
            _ => SubscriptionStatus::Expired,
        }
    }

    pub fn is_active_at(&self, now: DateTime) -> bool {
        self.status_at(now) == SubscriptionStatus::Active
    }
}

/// Subscription joined with its owning user, the unit the admin pages
/// list and delete.
#[derive(Debug, Serialize, Clone)]
pub struct SubscriptionRecord {
    #[serde(flatten)]
    pub subscription: Subscription,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
    pub status: SubscriptionStatus,
}

impl SubscriptionRecord {
    pub fn assemble(subscription: Subscription, user_id: String, user_email: Option<String>, now: DateTime) -> Self {
        let status = subscription.status_at(now);
        SubscriptionRecord {
            subscription,
            user_id,
            user_email,
            status,
        }
    }
}

#[derive(Debug, Default)]
pub struct SubscriptionFilters<'a> {
    pub search: Option<&'a str>,
    pub plan: Option<&'a str>,
    /// "active", "expired" or "dummy".
    pub status: Option<&'a str>,
}

pub fn filter_subscriptions<'a>(
    records: &'a [SubscriptionRecord],
    filters: &SubscriptionFilters,
    now: DateTime,
) -> Vec<&'a SubscriptionRecord> {
    records
        .iter()
        .filter(|r| match filters.search {
            Some(term) if !term.is_empty() => {
                contains_ci(r.user_email.as_deref(), term)
                    || contains_ci(r.subscription.plan.as_deref(), term)
                    || contains_ci(r.subscription.payment_id.as_deref(), term)
                    || contains_ci(r.subscription.method.as_deref(), term)
            }
            _ => true,
        })
        .filter(|r| match filters.plan {
            Some(plan) if !plan.is_empty() && plan != "all" => {
                r.subscription.plan.as_deref() == Some(plan)
            }
            _ => true,
        })
        .filter(|r| match filters.status {
            Some("active") => r.subscription.is_active_at(now),
            Some("expired") => !r.subscription.is_active_at(now) && !r.subscription.is_dummy,
            Some("dummy") => r.subscription.is_dummy,
            _ => true,
        })
        .collect()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, FromFormField, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionSort {
    Newest,
    Oldest,
    PriceHigh,
    PriceLow,
}

pub fn sort_subscriptions(records: &mut [&SubscriptionRecord], sort: SubscriptionSort) {
    records.sort_by(|a, b| {
        let a_ts = a
            .subscription
            .start_date
            .map(|d| d.timestamp_millis())
            .unwrap_or(0);
        let b_ts = b
            .subscription
            .start_date
            .map(|d| d.timestamp_millis())
            .unwrap_or(0);
        let a_price = a.subscription.price.unwrap_or(0.0);
        let b_price = b.subscription.price.unwrap_or(0.0);
        match sort {
            SubscriptionSort::Newest => b_ts.cmp(&a_ts),
            SubscriptionSort::Oldest => a_ts.cmp(&b_ts),
            SubscriptionSort::PriceHigh => b_price
                .partial_cmp(&a_price)
                .unwrap_or(std::cmp::Ordering::Equal),
            SubscriptionSort::PriceLow => a_price
                .partial_cmp(&b_price)
                .unwrap_or(std::cmp::Ordering::Equal),
        }
    });
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SubscriptionStats {
    pub total: u64,
    pub active: u64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
    pub dummy: u64,
    #[serde(rename = "planDistribution")]
    pub plan_distribution: BTreeMap<String, u64>,
}

/// Revenue here sums every subscription's price; untagged plans group
/// under "Unknown".
pub fn subscription_stats(records: &[SubscriptionRecord], now: DateTime) -> SubscriptionStats {
    let mut plan_distribution: BTreeMap<String, u64> = BTreeMap::new();
    for r in records {
        let plan = r
            .subscription
            .plan
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        *plan_distribution.entry(plan).or_insert(0) += 1;
    }

    SubscriptionStats {
        total: records.len() as u64,
        active: records
            .iter()
            .filter(|r| r.subscription.is_active_at(now))
            .count() as u64,
        total_revenue: records
            .iter()
            .map(|r| r.subscription.price.unwrap_or(0.0))
            .sum(),
        dummy: records.iter().filter(|r| r.subscription.is_dummy).count() as u64,
        plan_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn now() -> DateTime {
        DateTime::from_millis(NOW_MS)
    }

    fn subscription(id: &str, end_offset_ms: Option<i64>, is_dummy: bool) -> Subscription {
        Subscription {
            id: id.to_string(),
            plan: Some("gold".to_string()),
            plan_code: None,
            price: Some(499.0),
            method: None,
            payment_id: None,
            start_date: None,
            end_date: end_offset_ms.map(|off| DateTime::from_millis(NOW_MS + off)),
            is_dummy,
        }
    }

    fn record(sub: Subscription) -> SubscriptionRecord {
        SubscriptionRecord::assemble(sub, "u1".to_string(), None, now())
    }

    #[test]
    fn dummy_overrides_expiry() {
        let expired_dummy = subscription("a", Some(-1_000), true);
        assert_eq!(expired_dummy.status_at(now()), SubscriptionStatus::Test);
    }

    #[test]
    fn future_end_date_is_active() {
        assert_eq!(
            subscription("a", Some(1_000), false).status_at(now()),
            SubscriptionStatus::Active
        );
        assert_eq!(
            subscription("b", Some(-1_000), false).status_at(now()),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn end_date_equal_to_now_is_expired() {
        assert_eq!(
            subscription("a", Some(0), false).status_at(now()),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn missing_end_date_is_never_active() {
        assert_eq!(
            subscription("a", None, false).status_at(now()),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn status_filter_separates_dummy_from_expired() {
        let records = vec![
            record(subscription("a", Some(1_000), false)),
            record(subscription("b", Some(-1_000), false)),
            record(subscription("c", Some(-1_000), true)),
        ];

        let active = SubscriptionFilters {
            status: Some("active"),
            ..Default::default()
        };
        assert_eq!(filter_subscriptions(&records, &active, now()).len(), 1);

        let expired = SubscriptionFilters {
            status: Some("expired"),
            ..Default::default()
        };
        assert_eq!(filter_subscriptions(&records, &expired, now()).len(), 1);

        let dummy = SubscriptionFilters {
            status: Some("dummy"),
            ..Default::default()
        };
        assert_eq!(filter_subscriptions(&records, &dummy, now()).len(), 1);
    }

    #[test]
    fn stats_sum_all_prices_and_group_plans() {
        let mut other = subscription("b", Some(1_000), false);
        other.plan = None;
        other.price = Some(100.0);
        let records = vec![record(subscription("a", Some(1_000), false)), record(other)];

        let stats = subscription_stats(&records, now());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.total_revenue, 599.0);
        assert_eq!(stats.plan_distribution["gold"], 1);
        assert_eq!(stats.plan_distribution["Unknown"], 1);
    }

    #[test]
    fn price_sort_runs_both_directions() {
        let mut cheap = subscription("cheap", None, false);
        cheap.price = Some(99.0);
        let records = vec![record(subscription("gold", None, false)), record(cheap)];

        let mut view: Vec<&SubscriptionRecord> = records.iter().collect();
        sort_subscriptions(&mut view, SubscriptionSort::PriceHigh);
        assert_eq!(view[0].subscription.id, "gold");
        sort_subscriptions(&mut view, SubscriptionSort::PriceLow);
        assert_eq!(view[0].subscription.id, "cheap");
    }

    #[test]
    fn sort_deserializes_from_wire() {
        let sort: SubscriptionSort = serde_json::from_str("\"pricehigh\"").unwrap();
        assert_eq!(sort, SubscriptionSort::PriceHigh);
    }

    #[test]
    fn missing_start_date_sorts_as_epoch() {
        let mut dated = subscription("dated", None, false);
        dated.start_date = Some(now());
        let records = vec![record(subscription("undated", None, false)), record(dated)];

        let mut view: Vec<&SubscriptionRecord> = records.iter().collect();
        sort_subscriptions(&mut view, SubscriptionSort::Newest);
        assert_eq!(view[0].subscription.id, "dated");
    }
}
