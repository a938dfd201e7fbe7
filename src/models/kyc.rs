use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// One uploaded KYC document. The upload clients disagreed about the
/// name of the URL field, so all historical spellings are read and
/// resolved by precedence.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KycDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "fileUrl", default)]
    pub file_url: Option<String>,
    #[serde(rename = "documentUrl", default)]
    pub document_url: Option<String>,
    #[serde(rename = "uploadedAt", default)]
    pub uploaded_at: Option<DateTime>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime>,
}

impl KycDocument {
    /// Absence means the document slot exists but nothing was uploaded.
    pub fn resolved_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.photo_url.as_deref())
            .or(self.file_url.as_deref())
            .or(self.document_url.as_deref())
    }

    /// Document type tag, falling back to the record id which the
    /// mobile app keys by type.
    pub fn resolved_type(&self) -> &str {
        self.doc_type.as_deref().unwrap_or(&self.id)
    }

    pub fn resolved_uploaded_at(&self) -> Option<DateTime> {
        self.uploaded_at.or(self.created_at)
    }
}
