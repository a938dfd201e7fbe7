use mongodb::bson::{doc, Bson, DateTime};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{
    driver_stats, filter_drivers, sort_drivers, DriverFilters, DriverSortKey, SortDirection, User,
};
use crate::services::assemble::assemble_driver_profiles;
use crate::services::fetch::fetch_all;
use crate::utils::{ApiError, ApiResponse};

#[derive(FromForm, Deserialize, JsonSchema)]
pub struct DriverListQuery {
    pub name: Option<String>,
    pub vehicle: Option<String>,
    pub kyc_status: Option<String>,
    pub vehicle_status: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<DriverSortKey>,
    pub sort_dir: Option<SortDirection>,
}

#[openapi(tag = "Drivers")]
#[get("/admin/drivers?<query..>")]
pub async fn get_drivers(
    db: &State<DbConn>,
    _auth: AdminGuard,
    query: DriverListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let users: Vec<User> = fetch_all(
        db,
        "users",
        doc! { "role": "driver" },
        Some(doc! { "createdAt": -1 }),
    )
    .await
    .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let profiles = assemble_driver_profiles(db, users).await;
    let stats = driver_stats(&profiles);

    let filters = DriverFilters {
        name: query.name.as_deref(),
        vehicle: query.vehicle.as_deref(),
        kyc_status: query.kyc_status.as_deref(),
        vehicle_status: query.vehicle_status.as_deref(),
        status: query.status.as_deref(),
    };
    let mut filtered = filter_drivers(&profiles, &filters);

    if let Some(key) = query.sort_by {
        let direction = query.sort_dir.unwrap_or(SortDirection::Asc);
        sort_drivers(&mut filtered, key, direction);
    }

    Ok(Json(ApiResponse::success(serde_json::json!({
        "stats": stats,
        "drivers": filtered,
    }))))
}

#[derive(Deserialize, JsonSchema)]
pub struct ActiveDto {
    pub is_active: bool,
}

#[openapi(tag = "Drivers")]
#[put("/admin/drivers/<id>/active", data = "<dto>")]
pub async fn set_driver_active(
    db: &State<DbConn>,
    _auth: AdminGuard,
    id: &str,
    dto: Json<ActiveDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let result = db
        .collection::<User>("users")
        .update_one(
            doc! { "_id": id, "role": "driver" },
            doc! { "$set": {
                "is_active": dto.is_active,
                "updatedAt": DateTime::now(),
            }},
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Driver not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Driver status updated".to_string(),
        serde_json::json!({ "id": id, "isActive": dto.is_active }),
    )))
}

#[derive(Deserialize, JsonSchema)]
pub struct ReviewDto {
    pub status: String,
}

/// Review decision for submitted KYC documents. Only the two terminal
/// decisions are accepted here; intermediate states come from the
/// driver app itself.
#[openapi(tag = "Drivers")]
#[put("/admin/drivers/<id>/kyc-status", data = "<dto>")]
pub async fn set_driver_kyc_status(
    db: &State<DbConn>,
    _auth: AdminGuard,
    id: &str,
    dto: Json<ReviewDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let dto = dto.into_inner();
    if dto.status != "verified" && dto.status != "rejected" {
        return Err(ApiError::bad_request(
            "status must be 'verified' or 'rejected'",
        ));
    }

    let verified_at = if dto.status == "verified" {
        Bson::DateTime(DateTime::now())
    } else {
        Bson::Null
    };

    let result = db
        .collection::<User>("users")
        .update_one(
            doc! { "_id": id, "role": "driver" },
            doc! { "$set": {
                "kycStatus": &dto.status,
                "kycVerifiedAt": verified_at,
                "updatedAt": DateTime::now(),
            }},
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Driver not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "KYC status updated".to_string(),
        serde_json::json!({ "id": id, "kycStatus": dto.status }),
    )))
}

#[openapi(tag = "Drivers")]
#[put("/admin/drivers/<id>/vehicle-status", data = "<dto>")]
pub async fn set_driver_vehicle_status(
    db: &State<DbConn>,
    _auth: AdminGuard,
    id: &str,
    dto: Json<ReviewDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let dto = dto.into_inner();
    if dto.status != "verified" && dto.status != "rejected" {
        return Err(ApiError::bad_request(
            "status must be 'verified' or 'rejected'",
        ));
    }

    let verified_at = if dto.status == "verified" {
        Bson::DateTime(DateTime::now())
    } else {
        Bson::Null
    };

    let result = db
        .collection::<User>("users")
        .update_one(
            doc! { "_id": id, "role": "driver" },
            doc! { "$set": {
                "vehicleStatus": &dto.status,
                "vehicleVerifiedAt": verified_at,
                "updatedAt": DateTime::now(),
            }},
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Driver not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Vehicle status updated".to_string(),
        serde_json::json!({ "id": id, "vehicleStatus": dto.status }),
    )))
}
