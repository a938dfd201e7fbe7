use rocket::form::FromFormField;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::kyc::KycDocument;
use crate::models::sort::SortDirection;
use crate::models::user::{
    resolve_kyc_status, resolve_vehicle_active, KycDisplayStatus, User,
};
use crate::models::vehicle::Vehicle;
use crate::utils::text::contains_ci;

/// A driver record joined with its owned KYC document set and vehicle,
/// with every display status reconciled up front so the rest of the
/// code only ever sees the canonical shape.
#[derive(Debug, Serialize, Clone)]
pub struct DriverProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "kycDocuments")]
    pub kyc_documents: BTreeMap<String, KycDocument>,
    pub vehicle: Option<Vehicle>,
    #[serde(rename = "kycDocumentCount")]
    pub kyc_document_count: usize,
    #[serde(rename = "kycDisplayStatus")]
    pub kyc_display_status: KycDisplayStatus,
    #[serde(rename = "vehicleDisplayStatus")]
    pub vehicle_display_status: String,
    #[serde(rename = "vehicleIsActive")]
    pub vehicle_is_active: bool,
}

impl DriverProfile {
    pub fn assemble(
        user: User,
        kyc_documents: BTreeMap<String, KycDocument>,
        vehicle: Option<Vehicle>,
    ) -> Self {
        let kyc_document_count = kyc_documents.len();
        let kyc_display_status = resolve_kyc_status(
            user.kyc_approved,
            user.kyc_status.as_deref(),
            kyc_document_count,
        );
        let vehicle_display_status = user.vehicle_display_status().to_string();
        let vehicle_is_active = resolve_vehicle_active(user.vehicle_active);

        DriverProfile {
            user,
            kyc_documents,
            vehicle,
            kyc_document_count,
            kyc_display_status,
            vehicle_display_status,
            vehicle_is_active,
        }
    }
}

#[derive(Debug, Default)]
pub struct DriverFilters<'a> {
    pub name: Option<&'a str>,
    pub vehicle: Option<&'a str>,
    pub kyc_status: Option<&'a str>,
    pub vehicle_status: Option<&'a str>,
    pub status: Option<&'a str>,
}

/// Narrows the full driver set; empty values are no-ops and active
/// filters compose as AND. The source slice is never touched.
pub fn filter_drivers<'a>(
    drivers: &'a [DriverProfile],
    filters: &DriverFilters,
) -> Vec<&'a DriverProfile> {
    drivers
        .iter()
        .filter(|d| match filters.name {
            Some(term) if !term.is_empty() => {
                contains_ci(d.user.name.as_deref(), term)
                    || contains_ci(d.user.email.as_deref(), term)
            }
            _ => true,
        })
        .filter(|d| match filters.vehicle {
            Some(term) if !term.is_empty() => d.vehicle.as_ref().is_some_and(|v| {
                contains_ci(v.brand.as_deref(), term)
                    || contains_ci(v.model.as_deref(), term)
                    || contains_ci(v.number.as_deref(), term)
            }),
            _ => true,
        })
        .filter(|d| match filters.kyc_status {
            Some(status) if !status.is_empty() => d.kyc_display_status.as_str() == status,
            _ => true,
        })
        .filter(|d| match filters.vehicle_status {
            Some(status) if !status.is_empty() => d.vehicle_display_status == status,
            _ => true,
        })
        .filter(|d| match filters.status {
            Some("active") => d.user.is_active(),
            Some("inactive") => !d.user.is_active(),
            _ => true,
        })
        .collect()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, FromFormField, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DriverSortKey {
    Name,
    CreatedAt,
}

pub fn sort_drivers(drivers: &mut [&DriverProfile], key: DriverSortKey, direction: SortDirection) {
    drivers.sort_by(|a, b| {
        let ordering = match key {
            DriverSortKey::Name => {
                let a_name = a.user.name.as_deref().unwrap_or("");
                let b_name = b.user.name.as_deref().unwrap_or("");
                a_name.cmp(b_name)
            }
            DriverSortKey::CreatedAt => {
                let a_ts = a.user.created_at.map(|d| d.timestamp_millis()).unwrap_or(0);
                let b_ts = b.user.created_at.map(|d| d.timestamp_millis()).unwrap_or(0);
                a_ts.cmp(&b_ts)
            }
        };
        direction.apply(ordering)
    });
}

/// Summary cards. Always computed over the full fetched set, never the
/// filtered view.
#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub total: u64,
    #[serde(rename = "kycPending")]
    pub kyc_pending: u64,
    #[serde(rename = "kycVerified")]
    pub kyc_verified: u64,
    pub active: u64,
}

pub fn driver_stats(drivers: &[DriverProfile]) -> DriverStats {
    DriverStats {
        total: drivers.len() as u64,
        kyc_pending: drivers
            .iter()
            .filter(|d| d.kyc_display_status == KycDisplayStatus::Pending)
            .count() as u64,
        kyc_verified: drivers
            .iter()
            .filter(|d| d.kyc_display_status == KycDisplayStatus::Verified)
            .count() as u64,
        active: drivers.iter().filter(|d| d.user.is_active()).count() as u64,
    }
}
