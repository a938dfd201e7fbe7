use mongodb::bson::DateTime;
use rocket::form::FromFormField;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::sort::SortDirection;
use crate::utils::bson::f64_or_string;
use crate::utils::text::contains_ci;

/// Trip lifecycle. Older app builds wrote "active"/"ongoing" for an
/// in-progress trip and "pending" for an unassigned request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Requested,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
    Unknown,
}

impl BookingStatus {
    pub fn from_field(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "requested" | "pending" => BookingStatus::Requested,
            "accepted" => BookingStatus::Accepted,
            "in-progress" | "active" | "ongoing" => BookingStatus::InProgress,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Unknown,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Place {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(rename = "farePerKm", default, deserialize_with = "f64_or_string")]
    pub fare_per_km: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(rename = "riderId", default)]
    pub rider_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub pickup: Option<Place>,
    #[serde(default)]
    pub dropoff: Option<Place>,
    #[serde(rename = "tripKm", default, deserialize_with = "f64_or_string")]
    pub trip_km: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_string")]
    pub fare: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_string")]
    pub amount: Option<f64>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime>,
}

impl Booking {
    pub fn resolved_status(&self) -> BookingStatus {
        self.status
            .as_deref()
            .map(BookingStatus::from_field)
            .unwrap_or(BookingStatus::Unknown)
    }

    /// `fare` superseded `amount`; either may hold the trip total.
    pub fn resolved_fare(&self) -> f64 {
        self.fare.or(self.amount).unwrap_or(0.0)
    }

    pub fn fare_per_km(&self) -> f64 {
        self.dropoff
            .as_ref()
            .and_then(|d| d.fare_per_km)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Default)]
pub struct BookingFilters<'a> {
    pub driver_id: Option<&'a str>,
    pub rider_id: Option<&'a str>,
    pub status: Option<&'a str>,
    pub pickup: Option<&'a str>,
    pub dropoff: Option<&'a str>,
}

pub fn filter_bookings<'a>(
    bookings: &'a [Booking],
    filters: &BookingFilters,
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| match filters.driver_id {
            Some(term) if !term.is_empty() => contains_ci(b.driver_id.as_deref(), term),
            _ => true,
        })
        .filter(|b| match filters.rider_id {
            Some(term) if !term.is_empty() => contains_ci(b.rider_id.as_deref(), term),
            _ => true,
        })
        .filter(|b| match filters.status {
            Some(term) if !term.is_empty() => contains_ci(b.status.as_deref(), term),
            _ => true,
        })
        .filter(|b| match filters.pickup {
            Some(term) if !term.is_empty() => {
                contains_ci(b.pickup.as_ref().and_then(|p| p.label.as_deref()), term)
            }
            _ => true,
        })
        .filter(|b| match filters.dropoff {
            Some(term) if !term.is_empty() => {
                contains_ci(b.dropoff.as_ref().and_then(|p| p.label.as_deref()), term)
            }
            _ => true,
        })
        .collect()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, FromFormField, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingSortKey {
    CreatedAt,
    TripKm,
    FarePerKm,
    Status,
}

pub fn sort_bookings(bookings: &mut [&Booking], key: BookingSortKey, direction: SortDirection) {
    bookings.sort_by(|a, b| {
        let ordering = match key {
            BookingSortKey::CreatedAt => {
                let a_ts = a.created_at.map(|d| d.timestamp_millis()).unwrap_or(0);
                let b_ts = b.created_at.map(|d| d.timestamp_millis()).unwrap_or(0);
                a_ts.cmp(&b_ts)
            }
            BookingSortKey::TripKm => {
                let a_km = a.trip_km.unwrap_or(0.0);
                let b_km = b.trip_km.unwrap_or(0.0);
                a_km.partial_cmp(&b_km).unwrap_or(std::cmp::Ordering::Equal)
            }
            BookingSortKey::FarePerKm => a
                .fare_per_km()
                .partial_cmp(&b.fare_per_km())
                .unwrap_or(std::cmp::Ordering::Equal),
            BookingSortKey::Status => {
                let a_status = a.status.as_deref().unwrap_or("");
                let b_status = b.status.as_deref().unwrap_or("");
                a_status.cmp(b_status)
            }
        };
        direction.apply(ordering)
    });
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct BookingStats {
    pub total: u64,
    pub requested: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub active: u64,
    #[serde(rename = "totalDistanceKm")]
    pub total_distance_km: f64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
}

/// Reductions over the unfiltered booking set. Revenue counts only
/// completed trips; a missing fare counts as zero.
pub fn booking_stats(bookings: &[Booking]) -> BookingStats {
    let mut stats = BookingStats {
        total: bookings.len() as u64,
        ..Default::default()
    };

    for booking in bookings {
        match booking.resolved_status() {
            BookingStatus::Requested => stats.requested += 1,
            BookingStatus::Completed => {
                stats.completed += 1;
                stats.total_revenue += booking.resolved_fare();
            }
            BookingStatus::Cancelled => stats.cancelled += 1,
            BookingStatus::Accepted | BookingStatus::InProgress => stats.active += 1,
            BookingStatus::Unknown => {}
        }
        stats.total_distance_km += booking.trip_km.unwrap_or(0.0);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(id: &str, status: &str, fare: Option<f64>) -> Booking {
        Booking {
            id: id.to_string(),
            driver_id: None,
            rider_id: None,
            status: Some(status.to_string()),
            pickup: None,
            dropoff: None,
            trip_km: None,
            fare,
            amount: None,
            created_at: None,
        }
    }

    #[test]
    fn revenue_counts_only_completed_trips() {
        let bookings = vec![
            booking("a", "completed", Some(10.0)),
            booking("b", "cancelled", Some(99.0)),
            booking("c", "completed", Some(5.0)),
        ];
        let stats = booking_stats(&bookings);
        assert_eq!(stats.total_revenue, 15.0);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.cancelled, 1);
    }

    #[test]
    fn missing_fare_counts_as_zero() {
        let bookings = vec![booking("a", "completed", None)];
        assert_eq!(booking_stats(&bookings).total_revenue, 0.0);
    }

    #[test]
    fn legacy_status_spellings_resolve() {
        assert_eq!(
            BookingStatus::from_field("ongoing"),
            BookingStatus::InProgress
        );
        assert_eq!(
            BookingStatus::from_field("ACTIVE"),
            BookingStatus::InProgress
        );
        assert_eq!(
            BookingStatus::from_field("pending"),
            BookingStatus::Requested
        );
        assert_eq!(BookingStatus::from_field("???"), BookingStatus::Unknown);
    }

    #[test]
    fn active_count_spans_accepted_and_in_progress() {
        let bookings = vec![
            booking("a", "accepted", None),
            booking("b", "ongoing", None),
            booking("c", "requested", None),
        ];
        let stats = booking_stats(&bookings);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.requested, 1);
    }

    #[test]
    fn fare_falls_back_to_amount() {
        let mut b = booking("a", "completed", None);
        b.amount = Some(42.0);
        assert_eq!(b.resolved_fare(), 42.0);
        b.fare = Some(7.0);
        assert_eq!(b.resolved_fare(), 7.0);
    }

    #[test]
    fn string_trip_km_parses() {
        let doc = mongodb::bson::doc! { "_id": "b1", "tripKm": "12.5" };
        let b: Booking = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(b.trip_km, Some(12.5));

        let doc = mongodb::bson::doc! { "_id": "b2", "tripKm": "junk" };
        let b: Booking = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(b.trip_km, None);
    }

    #[test]
    fn stats_invariant_under_filters() {
        let bookings = vec![
            booking("a", "completed", Some(10.0)),
            booking("b", "requested", None),
        ];
        let before = booking_stats(&bookings);
        let filters = BookingFilters {
            status: Some("completed"),
            ..Default::default()
        };
        let _view = filter_bookings(&bookings, &filters);
        assert_eq!(booking_stats(&bookings), before);
    }

    #[test]
    fn missing_timestamp_sorts_to_epoch() {
        let mut a = booking("a", "completed", None);
        a.created_at = Some(mongodb::bson::DateTime::from_millis(1_000));
        let b = booking("b", "completed", None);
        let bookings = vec![a, b];

        let mut view: Vec<&Booking> = bookings.iter().collect();
        sort_bookings(&mut view, BookingSortKey::CreatedAt, SortDirection::Asc);
        assert_eq!(view[0].id, "b");
    }

    #[test]
    fn fare_per_km_sort_reads_nested_field() {
        let mut a = booking("a", "completed", None);
        a.dropoff = Some(Place {
            label: None,
            lat: None,
            lng: None,
            fare_per_km: Some(12.0),
        });
        let b = booking("b", "completed", None);
        let bookings = vec![a, b];

        let mut view: Vec<&Booking> = bookings.iter().collect();
        sort_bookings(&mut view, BookingSortKey::FarePerKm, SortDirection::Desc);
        assert_eq!(view[0].id, "a");
    }

    #[test]
    fn sort_key_deserializes_from_wire() {
        let key: BookingSortKey = serde_json::from_str("\"fareperkm\"").unwrap();
        assert_eq!(key, BookingSortKey::FarePerKm);
    }

    #[test]
    fn filters_match_labels_case_insensitively() {
        let mut a = booking("a", "completed", None);
        a.pickup = Some(Place {
            label: Some("MG Road".to_string()),
            lat: None,
            lng: None,
            fare_per_km: None,
        });
        let bookings = vec![a, booking("b", "completed", None)];

        let filters = BookingFilters {
            pickup: Some("mg road"),
            ..Default::default()
        };
        assert_eq!(filter_bookings(&bookings, &filters).len(), 1);
    }
}
