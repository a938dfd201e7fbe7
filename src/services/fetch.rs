use log::warn;
use mongodb::bson::Document;
use mongodb::options::FindOptions;
use mongodb::Cursor;
use serde::de::DeserializeOwned;

use crate::db::DbConn;

pub async fn collect_cursor<T>(mut cursor: Cursor<T>) -> Result<Vec<T>, mongodb::error::Error>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = Vec::new();
    while cursor.advance().await? {
        items.push(cursor.deserialize_current()?);
    }
    Ok(items)
}

/// Full collection scan with an optional sort. A failing ordered query
/// (missing index, for one) retries as an unordered scan before the
/// error is surfaced.
pub async fn fetch_all<T>(
    db: &DbConn,
    collection: &str,
    filter: Document,
    sort: Option<Document>,
) -> Result<Vec<T>, mongodb::error::Error>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    if let Some(sort_doc) = sort {
        let options = FindOptions::builder().sort(sort_doc).build();
        let ordered = match db.collection::<T>(collection).find(filter.clone(), options).await {
            Ok(cursor) => collect_cursor(cursor).await,
            Err(e) => Err(e),
        };
        match ordered {
            Ok(items) => return Ok(items),
            Err(e) => {
                warn!(
                    "ordered scan of '{}' failed, retrying unordered: {}",
                    collection, e
                );
            }
        }
    }

    let cursor = db.collection::<T>(collection).find(filter, None).await?;
    collect_cursor(cursor).await
}
