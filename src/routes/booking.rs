use mongodb::bson::doc;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{
    booking_stats, filter_bookings, sort_bookings, Booking, BookingFilters, BookingSortKey,
    SortDirection,
};
use crate::services::fetch::fetch_all;
use crate::utils::{ApiError, ApiResponse};

#[derive(FromForm, Deserialize, JsonSchema)]
pub struct BookingListQuery {
    pub driver_id: Option<String>,
    pub rider_id: Option<String>,
    pub status: Option<String>,
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
    pub sort_by: Option<BookingSortKey>,
    pub sort_dir: Option<SortDirection>,
}

#[openapi(tag = "Bookings")]
#[get("/admin/bookings?<query..>")]
pub async fn get_bookings(
    db: &State<DbConn>,
    _auth: AdminGuard,
    query: BookingListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let bookings: Vec<Booking> =
        fetch_all(db, "bookings", doc! {}, Some(doc! { "createdAt": -1 }))
            .await
            .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let stats = booking_stats(&bookings);

    let filters = BookingFilters {
        driver_id: query.driver_id.as_deref(),
        rider_id: query.rider_id.as_deref(),
        status: query.status.as_deref(),
        pickup: query.pickup.as_deref(),
        dropoff: query.dropoff.as_deref(),
    };
    let mut filtered = filter_bookings(&bookings, &filters);

    let key = query.sort_by.unwrap_or(BookingSortKey::CreatedAt);
    let direction = query.sort_dir.unwrap_or(SortDirection::Desc);
    sort_bookings(&mut filtered, key, direction);

    Ok(Json(ApiResponse::success(serde_json::json!({
        "stats": stats,
        "bookings": filtered,
    }))))
}
