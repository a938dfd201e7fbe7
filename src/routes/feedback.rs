use mongodb::bson::doc;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{feedback_stats, filter_feedback, sort_feedback, Feedback, FeedbackSort};
use crate::services::fetch::fetch_all;
use crate::utils::{ApiError, ApiResponse};

#[derive(FromForm, Deserialize, JsonSchema)]
pub struct FeedbackListQuery {
    pub search: Option<String>,
    pub rating: Option<i32>,
    pub sort: Option<FeedbackSort>,
}

#[openapi(tag = "Feedback")]
#[get("/admin/feedback?<query..>")]
pub async fn get_feedback(
    db: &State<DbConn>,
    _auth: AdminGuard,
    query: FeedbackListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let feedback: Vec<Feedback> =
        fetch_all(db, "feedback", doc! {}, Some(doc! { "createdAt": -1 }))
            .await
            .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let stats = feedback_stats(&feedback);

    let mut filtered = filter_feedback(&feedback, query.search.as_deref(), query.rating);
    sort_feedback(&mut filtered, query.sort.unwrap_or(FeedbackSort::Newest));

    Ok(Json(ApiResponse::success(serde_json::json!({
        "stats": stats,
        "feedback": filtered,
    }))))
}

#[openapi(tag = "Feedback")]
#[delete("/admin/feedback/<id>")]
pub async fn delete_feedback(
    db: &State<DbConn>,
    _auth: AdminGuard,
    id: &str,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let result = db
        .collection::<Feedback>("feedback")
        .delete_one(doc! { "_id": id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Feedback not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Feedback deleted".to_string(),
        serde_json::json!({ "id": id }),
    )))
}
