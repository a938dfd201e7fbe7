use mongodb::bson::DateTime;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::bson::bool_or_none;
use crate::utils::text::contains_ci;

/// Canonical KYC status shown to the admin, reconciled from the
/// legacy field shapes that coexist in the `users` collection.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum KycDisplayStatus {
    Verified,
    Pending,
    Rejected,
    Submitted,
    NotSubmitted,
}

impl KycDisplayStatus {
    /// Parses the legacy string-valued `kycStatus` field. Unknown values
    /// (the old "incomplete" marker included) read as not-submitted so a
    /// malformed record can never surface as verified.
    pub fn from_field(value: &str) -> Self {
        match value {
            "verified" => KycDisplayStatus::Verified,
            "pending" => KycDisplayStatus::Pending,
            "rejected" => KycDisplayStatus::Rejected,
            "submitted" => KycDisplayStatus::Submitted,
            _ => KycDisplayStatus::NotSubmitted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KycDisplayStatus::Verified => "verified",
            KycDisplayStatus::Pending => "pending",
            KycDisplayStatus::Rejected => "rejected",
            KycDisplayStatus::Submitted => "submitted",
            KycDisplayStatus::NotSubmitted => "not-submitted",
        }
    }
}

/// Maps the historical KYC field shapes to one display status.
///
/// The boolean `kyc_approved` is the newest schema and wins outright.
/// Otherwise uploaded documents with no explicit status mean the driver
/// has submitted but nobody has looked yet.
pub fn resolve_kyc_status(
    kyc_approved: Option<bool>,
    kyc_status: Option<&str>,
    document_count: usize,
) -> KycDisplayStatus {
    if let Some(approved) = kyc_approved {
        return if approved {
            KycDisplayStatus::Verified
        } else {
            KycDisplayStatus::Pending
        };
    }

    let field = kyc_status.map(KycDisplayStatus::from_field);
    match field {
        None | Some(KycDisplayStatus::NotSubmitted) if document_count > 0 => {
            KycDisplayStatus::Submitted
        }
        Some(status) => status,
        None => KycDisplayStatus::NotSubmitted,
    }
}

/// A vehicle is in service unless the flag was explicitly cleared;
/// records predating the field default to active.
pub fn resolve_vehicle_active(vehicle_active: Option<bool>) -> bool {
    vehicle_active != Some(false)
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Driver,
    Rider,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "bool_or_none")]
    pub kyc_approved: Option<bool>,
    #[serde(rename = "kycStatus", default)]
    pub kyc_status: Option<String>,
    #[serde(rename = "vehicleStatus", default)]
    pub vehicle_status: Option<String>,
    #[serde(rename = "vehicleActive", default)]
    pub vehicle_active: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime>,
}

impl User {
    /// Records with no role tag are riders; "client" and "customer"
    /// are earlier spellings of the same thing.
    pub fn resolved_role(&self) -> Role {
        match self.role.as_deref() {
            Some("driver") => Role::Driver,
            _ => Role::Rider,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }

    /// Verification status of the driver's vehicle paperwork, distinct
    /// from the in-service flag.
    pub fn vehicle_display_status(&self) -> &str {
        self.vehicle_status.as_deref().unwrap_or("not-submitted")
    }
}

/// Dashboard user-table narrowing: substring search over id, email and
/// both name spellings, then the role filter with rider aliasing.
pub fn filter_users<'a>(
    users: &'a [User],
    search: Option<&str>,
    role: Option<&str>,
) -> Vec<&'a User> {
    users
        .iter()
        .filter(|user| match search {
            Some(term) if !term.is_empty() => {
                user.id.to_lowercase().contains(&term.to_lowercase())
                    || contains_ci(user.email.as_deref(), term)
                    || contains_ci(user.name.as_deref(), term)
                    || contains_ci(user.display_name.as_deref(), term)
            }
            _ => true,
        })
        .filter(|user| match role {
            Some("rider") => user.resolved_role() == Role::Rider,
            Some(role) if !role.is_empty() && role != "all" => {
                user.role.as_deref() == Some(role)
            }
            _ => true,
        })
        .collect()
}
