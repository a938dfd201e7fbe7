use chrono::{Datelike, NaiveDate};
use mongodb::bson::doc;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{
    booking_stats, filter_users, Booking, BookingStatus, DriverProfile, KycDisplayStatus, Role,
    User,
};
use crate::services::assemble::assemble_driver_profiles;
use crate::services::fetch::fetch_all;
use crate::utils::{ApiError, ApiResponse};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Serialize, Default, PartialEq, Eq)]
struct KycDistribution {
    verified: u64,
    pending: u64,
    rejected: u64,
    submitted: u64,
    #[serde(rename = "notSubmitted")]
    not_submitted: u64,
}

fn kyc_distribution(drivers: &[DriverProfile]) -> KycDistribution {
    let mut dist = KycDistribution::default();
    for driver in drivers {
        match driver.kyc_display_status {
            KycDisplayStatus::Verified => dist.verified += 1,
            KycDisplayStatus::Pending => dist.pending += 1,
            KycDisplayStatus::Rejected => dist.rejected += 1,
            KycDisplayStatus::Submitted => dist.submitted += 1,
            KycDisplayStatus::NotSubmitted => dist.not_submitted += 1,
        }
    }
    dist
}

#[derive(Debug, Serialize, Default, PartialEq, Eq)]
struct VehicleCounts {
    active: u64,
    inactive: u64,
    #[serde(rename = "withoutInfo")]
    without_info: u64,
}

/// Active/inactive only count drivers that actually have a vehicle
/// record; the rest go in their own bucket.
fn vehicle_counts(drivers: &[DriverProfile]) -> VehicleCounts {
    let mut counts = VehicleCounts::default();
    for driver in drivers {
        if driver.vehicle.is_none() {
            counts.without_info += 1;
        } else if driver.vehicle_is_active {
            counts.active += 1;
        } else {
            counts.inactive += 1;
        }
    }
    counts
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct MonthlyRegistration {
    month: &'static str,
    drivers: u64,
    clients: u64,
}

/// Registrations per calendar month of the given year; the chart shows
/// the first six months.
fn monthly_registrations(
    drivers: &[DriverProfile],
    clients: &[User],
    year: i32,
) -> Vec<MonthlyRegistration> {
    let mut rows: Vec<MonthlyRegistration> = MONTHS
        .iter()
        .map(|&month| MonthlyRegistration {
            month,
            drivers: 0,
            clients: 0,
        })
        .collect();

    for driver in drivers {
        if let Some(ts) = driver.user.created_at {
            let date = ts.to_chrono();
            if date.year() == year {
                rows[date.month0() as usize].drivers += 1;
            }
        }
    }
    for client in clients {
        if let Some(ts) = client.created_at {
            let date = ts.to_chrono();
            if date.year() == year {
                rows[date.month0() as usize].clients += 1;
            }
        }
    }

    rows.truncate(6);
    rows
}

#[derive(Debug, Serialize, PartialEq)]
struct DailyRevenue {
    day: &'static str,
    revenue: f64,
    bookings: u64,
}

fn week_start(today: NaiveDate) -> NaiveDate {
    today - chrono::Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

/// Completed-trip revenue bucketed Mon..Sun for the week starting at
/// `start`.
fn weekly_revenue(bookings: &[Booking], start: NaiveDate) -> Vec<DailyRevenue> {
    let mut days: Vec<DailyRevenue> = DAYS
        .iter()
        .map(|&day| DailyRevenue {
            day,
            revenue: 0.0,
            bookings: 0,
        })
        .collect();

    for booking in bookings {
        if booking.resolved_status() != BookingStatus::Completed {
            continue;
        }
        let Some(created) = booking.created_at else {
            continue;
        };
        let diff = (created.to_chrono().date_naive() - start).num_days();
        if (0..7).contains(&diff) {
            let slot = &mut days[diff as usize];
            slot.revenue += booking.resolved_fare();
            slot.bookings += 1;
        }
    }

    days
}

#[openapi(tag = "Dashboard")]
#[get("/admin/dashboard")]
pub async fn get_dashboard(
    db: &State<DbConn>,
    _auth: AdminGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let users: Vec<User> = fetch_all(db, "users", doc! {}, Some(doc! { "createdAt": -1 }))
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let (driver_users, clients): (Vec<User>, Vec<User>) = users
        .into_iter()
        .partition(|u| u.resolved_role() == Role::Driver);

    let bookings: Vec<Booking> =
        fetch_all(db, "bookings", doc! {}, Some(doc! { "createdAt": -1 }))
            .await
            .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    let bookings_summary = booking_stats(&bookings);
    let recent_bookings: Vec<&Booking> = bookings.iter().take(5).collect();

    let drivers = assemble_driver_profiles(db, driver_users).await;
    let kyc = kyc_distribution(&drivers);
    let vehicles = vehicle_counts(&drivers);

    let now = chrono::Utc::now();
    let monthly = monthly_registrations(&drivers, &clients, now.year());
    let weekly = weekly_revenue(&bookings, week_start(now.date_naive()));

    let active_drivers = drivers.iter().filter(|d| d.user.is_active()).count();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "stats": {
            "totalClients": clients.len(),
            "totalDrivers": drivers.len(),
            "activeDrivers": active_drivers,
            "totalRevenue": bookings_summary.total_revenue,
            "activeBookings": bookings_summary.active,
            "kyc": kyc,
            "vehicles": vehicles,
        },
        "monthlyRegistrations": monthly,
        "weeklyRevenue": weekly,
        "recentBookings": recent_bookings,
    }))))
}

#[derive(FromForm, Deserialize, JsonSchema)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<String>,
}

#[openapi(tag = "Dashboard")]
#[get("/admin/users?<query..>")]
pub async fn get_all_users(
    db: &State<DbConn>,
    _auth: AdminGuard,
    query: UserListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let users: Vec<User> = fetch_all(db, "users", doc! {}, Some(doc! { "createdAt": -1 }))
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let filtered = filter_users(&users, query.search.as_deref(), query.role.as_deref());

    Ok(Json(ApiResponse::success(serde_json::json!({
        "total": users.len(),
        "users": filtered,
    }))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;
    use std::collections::BTreeMap;

    fn driver_created(ms: Option<i64>) -> DriverProfile {
        let user = User {
            id: "d".to_string(),
            role: Some("driver".to_string()),
            name: None,
            display_name: None,
            username: None,
            email: None,
            phone: None,
            phone_number: None,
            photo_url: None,
            kyc_approved: None,
            kyc_status: None,
            vehicle_status: None,
            vehicle_active: None,
            is_active: None,
            created_at: ms.map(DateTime::from_millis),
            updated_at: None,
        };
        DriverProfile::assemble(user, BTreeMap::new(), None)
    }

    fn booking_on(date: &str, status: &str, fare: f64) -> Booking {
        let ts = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        Booking {
            id: date.to_string(),
            driver_id: None,
            rider_id: None,
            status: Some(status.to_string()),
            pickup: None,
            dropoff: None,
            trip_km: None,
            fare: Some(fare),
            amount: None,
            created_at: Some(DateTime::from_millis(ts)),
        }
    }

    #[test]
    fn kyc_distribution_covers_every_bucket() {
        let mut verified = driver_created(None);
        verified.user.kyc_approved = Some(true);
        let verified = DriverProfile::assemble(verified.user, BTreeMap::new(), None);
        let blank = driver_created(None);

        let dist = kyc_distribution(&[verified, blank]);
        assert_eq!(dist.verified, 1);
        assert_eq!(dist.not_submitted, 1);
        assert_eq!(dist.pending + dist.rejected + dist.submitted, 0);
    }

    #[test]
    fn vehicle_counts_separate_missing_records() {
        use crate::models::Vehicle;
        let with_vehicle = {
            let mut d = driver_created(None);
            d.vehicle = Some(Vehicle {
                id: "v".to_string(),
                driver_id: None,
                brand: None,
                model: None,
                category: None,
                vehicle_type: None,
                number: None,
                document_url: None,
                photo_url: None,
            });
            d
        };
        let without = driver_created(None);

        let counts = vehicle_counts(&[with_vehicle, without]);
        assert_eq!(counts.active, 1);
        assert_eq!(counts.without_info, 1);
        assert_eq!(counts.inactive, 0);
    }

    #[test]
    fn monthly_registrations_show_first_six_months() {
        // 2024-02-10
        let feb = NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        let drivers = vec![driver_created(Some(feb))];
        let rows = monthly_registrations(&drivers, &[], 2024);

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].month, "Feb");
        assert_eq!(rows[1].drivers, 1);
        assert_eq!(rows[0].drivers, 0);
    }

    #[test]
    fn other_years_do_not_count() {
        let old = NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        let drivers = vec![driver_created(Some(old))];
        let rows = monthly_registrations(&drivers, &[], 2024);
        assert!(rows.iter().all(|r| r.drivers == 0));
    }

    #[test]
    fn weekly_revenue_buckets_by_weekday() {
        // 2024-01-01 is a Monday.
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bookings = vec![
            booking_on("2024-01-01", "completed", 10.0),
            booking_on("2024-01-03", "completed", 5.0),
            booking_on("2024-01-03", "cancelled", 99.0),
            booking_on("2023-12-31", "completed", 50.0),
        ];

        let days = weekly_revenue(&bookings, start);
        assert_eq!(days[0].revenue, 10.0);
        assert_eq!(days[2].revenue, 5.0);
        assert_eq!(days[2].bookings, 1);
        let total: f64 = days.iter().map(|d| d.revenue).sum();
        assert_eq!(total, 15.0);
    }

    #[test]
    fn week_start_is_monday() {
        // 2024-01-04 is a Thursday.
        let thursday = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        assert_eq!(
            week_start(thursday),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(week_start(monday), monday);
    }
}
