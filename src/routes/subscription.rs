use mongodb::bson::{doc, DateTime};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{
    filter_subscriptions, sort_subscriptions, subscription_stats, Subscription,
    SubscriptionFilters, SubscriptionSort,
};
use crate::services::assemble::collect_subscription_records;
use crate::utils::{ApiError, ApiResponse};

#[derive(FromForm, Deserialize, JsonSchema)]
pub struct SubscriptionListQuery {
    pub search: Option<String>,
    pub plan: Option<String>,
    pub status: Option<String>,
    pub sort: Option<SubscriptionSort>,
}

#[openapi(tag = "Subscriptions")]
#[get("/admin/subscriptions?<query..>")]
pub async fn get_subscriptions(
    db: &State<DbConn>,
    _auth: AdminGuard,
    query: SubscriptionListQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let records = collect_subscription_records(db)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let now = DateTime::now();
    let stats = subscription_stats(&records, now);

    let filters = SubscriptionFilters {
        search: query.search.as_deref(),
        plan: query.plan.as_deref(),
        status: query.status.as_deref(),
    };
    let mut filtered = filter_subscriptions(&records, &filters, now);
    sort_subscriptions(&mut filtered, query.sort.unwrap_or(SubscriptionSort::Newest));

    Ok(Json(ApiResponse::success(serde_json::json!({
        "stats": stats,
        "subscriptions": filtered,
    }))))
}

#[openapi(tag = "Subscriptions")]
#[delete("/admin/subscriptions/<user_id>/<sub_id>")]
pub async fn delete_subscription(
    db: &State<DbConn>,
    _auth: AdminGuard,
    user_id: &str,
    sub_id: &str,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let result = db
        .collection::<Subscription>("subscriptions")
        .delete_one(doc! { "_id": sub_id, "userId": user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Subscription not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Subscription deleted".to_string(),
        serde_json::json!({ "userId": user_id, "subscriptionId": sub_id }),
    )))
}
