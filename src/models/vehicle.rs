use serde::{Deserialize, Serialize};

/// Vehicle record owned by one driver. Only the first record per
/// driver is read even if more exist upstream.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vehicle {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "type", default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(rename = "documentUrl", default)]
    pub document_url: Option<String>,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
}
