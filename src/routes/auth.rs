use mongodb::bson::doc;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{AdminAccount, LoginDto, Session};
use crate::services::JwtService;
use crate::utils::{ApiError, ApiResponse};

/// Equality lookup against the legacy `admin_auth` collection, then a
/// signed token so every later call is validated server-side instead
/// of trusting whatever the browser kept.
#[openapi(tag = "Auth")]
#[post("/auth/login", data = "<dto>")]
pub async fn login(
    db: &State<DbConn>,
    dto: Json<LoginDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let account = db
        .collection::<AdminAccount>("admin_auth")
        .find_one(
            doc! { "email": &dto.email, "password": &dto.password },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let token = JwtService::generate_token(&account.id, &account.email)
        .map_err(|e| ApiError::internal_error(format!("Failed to issue token: {}", e)))?;

    let session = Session {
        id: account.id.clone(),
        email: account.email.clone(),
        login_time: chrono::Utc::now().to_rfc3339(),
    };

    Ok(Json(ApiResponse::success(serde_json::json!({
        "token": token,
        "session": session,
    }))))
}

#[openapi(tag = "Auth")]
#[get("/auth/session")]
pub async fn get_session(
    auth: AdminGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    Ok(Json(ApiResponse::success(serde_json::json!({
        "id": auth.admin_id,
        "email": auth.email,
    }))))
}
