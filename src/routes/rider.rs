use mongodb::bson::doc;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{filter_riders, sort_riders, RiderFilters, RiderSortKey, SortDirection, User};
use crate::services::fetch::fetch_all;
use crate::utils::{ApiError, ApiResponse};

#[derive(FromForm, Deserialize, JsonSchema)]
pub struct RiderListQuery {
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub username: Option<String>,
    pub updated_at: Option<String>,
    pub sort_by: Option<RiderSortKey>,
    pub sort_dir: Option<SortDirection>,
}

#[openapi(tag = "Riders")]
#[get("/admin/riders?<query..>")]
pub async fn get_riders(
    db: &State<DbConn>,
    _auth: AdminGuard,
    query: RiderListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let riders: Vec<User> = fetch_all(
        db,
        "users",
        doc! { "role": { "$ne": "driver" } },
        Some(doc! { "updatedAt": -1 }),
    )
    .await
    .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let filters = RiderFilters {
        phone_number: query.phone_number.as_deref(),
        role: query.role.as_deref(),
        username: query.username.as_deref(),
        updated_at: query.updated_at.as_deref(),
    };
    let mut filtered = filter_riders(&riders, &filters);

    if let Some(key) = query.sort_by {
        let direction = query.sort_dir.unwrap_or(SortDirection::Asc);
        sort_riders(&mut filtered, key, direction);
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "total": riders.len(),
        "riders": filtered,
    }))))
}
