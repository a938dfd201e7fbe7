use futures::stream::{self, StreamExt};
use log::warn;
use mongodb::bson::{doc, DateTime};
use std::collections::BTreeMap;

use crate::config::Config;
use crate::db::DbConn;
use crate::models::{DriverProfile, KycDocument, Subscription, SubscriptionRecord, User, Vehicle};
use crate::services::fetch::{collect_cursor, fetch_all};

/// Joins each driver with its KYC document set and vehicle record.
///
/// Joins run concurrently but capped at the configured limit, in input
/// order so the caller's createdAt ordering survives. A record whose
/// subcollection reads fail gets empty defaults instead of sinking the
/// whole batch.
pub async fn assemble_driver_profiles(db: &DbConn, drivers: Vec<User>) -> Vec<DriverProfile> {
    let limit = Config::join_concurrency().max(1);

    stream::iter(drivers)
        .map(|user| async move {
            let documents = match fetch_kyc_documents(db, &user.id).await {
                Ok(documents) => documents,
                Err(e) => {
                    warn!("KYC document fetch failed for driver {}: {}", user.id, e);
                    BTreeMap::new()
                }
            };
            let vehicle = match fetch_first_vehicle(db, &user.id).await {
                Ok(vehicle) => vehicle,
                Err(e) => {
                    warn!("vehicle fetch failed for driver {}: {}", user.id, e);
                    None
                }
            };
            DriverProfile::assemble(user, documents, vehicle)
        })
        .buffered(limit)
        .collect()
        .await
}

/// KYC documents keyed by type; each type appears at most once, a
/// re-upload replaces the earlier entry.
async fn fetch_kyc_documents(
    db: &DbConn,
    driver_id: &str,
) -> Result<BTreeMap<String, KycDocument>, mongodb::error::Error> {
    let cursor = db
        .collection::<KycDocument>("kyc_documents")
        .find(doc! { "driverId": driver_id }, None)
        .await?;
    let documents = collect_cursor(cursor).await?;

    let mut by_type = BTreeMap::new();
    for document in documents {
        by_type.insert(document.resolved_type().to_string(), document);
    }
    Ok(by_type)
}

async fn fetch_first_vehicle(
    db: &DbConn,
    driver_id: &str,
) -> Result<Option<Vehicle>, mongodb::error::Error> {
    db.collection::<Vehicle>("vehicles")
        .find_one(doc! { "driverId": driver_id }, None)
        .await
}

/// Walks every user and gathers their owned subscriptions, newest
/// first per user. Per-user read failures degrade to an empty list.
pub async fn collect_subscription_records(
    db: &DbConn,
) -> Result<Vec<SubscriptionRecord>, mongodb::error::Error> {
    let users: Vec<User> = fetch_all(db, "users", doc! {}, None).await?;
    let limit = Config::join_concurrency().max(1);
    let now = DateTime::now();

    let per_user: Vec<Vec<SubscriptionRecord>> = stream::iter(users)
        .map(|user| async move {
            let subscriptions = match fetch_user_subscriptions(db, &user.id).await {
                Ok(subscriptions) => subscriptions,
                Err(e) => {
                    warn!("subscription fetch failed for user {}: {}", user.id, e);
                    Vec::new()
                }
            };
            subscriptions
                .into_iter()
                .map(|s| SubscriptionRecord::assemble(s, user.id.clone(), user.email.clone(), now))
                .collect()
        })
        .buffered(limit)
        .collect()
        .await;

    Ok(per_user.into_iter().flatten().collect())
}

async fn fetch_user_subscriptions(
    db: &DbConn,
    user_id: &str,
) -> Result<Vec<Subscription>, mongodb::error::Error> {
    fetch_all(
        db,
        "subscriptions",
        doc! { "userId": user_id },
        Some(doc! { "startDate": -1 }),
    )
    .await
}
