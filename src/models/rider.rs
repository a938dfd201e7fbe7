use rocket::form::FromFormField;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Deserialize;

use crate::models::sort::SortDirection;
use crate::models::user::User;
use crate::utils::text::contains_ci;

#[derive(Debug, Default)]
pub struct RiderFilters<'a> {
    pub phone_number: Option<&'a str>,
    pub role: Option<&'a str>,
    pub username: Option<&'a str>,
    /// Substring match against the last-updated calendar date, the way
    /// the rider table's date column filters.
    pub updated_at: Option<&'a str>,
}

pub fn filter_riders<'a>(riders: &'a [User], filters: &RiderFilters) -> Vec<&'a User> {
    riders
        .iter()
        .filter(|r| match filters.phone_number {
            Some(term) if !term.is_empty() => contains_ci(r.phone_number.as_deref(), term),
            _ => true,
        })
        .filter(|r| match filters.role {
            Some(term) if !term.is_empty() => contains_ci(r.role.as_deref(), term),
            _ => true,
        })
        .filter(|r| match filters.username {
            Some(term) if !term.is_empty() => contains_ci(r.username.as_deref(), term),
            _ => true,
        })
        .filter(|r| match filters.updated_at {
            Some(term) if !term.is_empty() => match r.updated_at {
                Some(ts) => {
                    let date = ts.to_chrono().format("%-m/%-d/%Y").to_string();
                    date.to_lowercase().contains(&term.to_lowercase())
                }
                None => false,
            },
            _ => true,
        })
        .collect()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, FromFormField, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiderSortKey {
    Username,
    UpdatedAt,
}

pub fn sort_riders(riders: &mut [&User], key: RiderSortKey, direction: SortDirection) {
    riders.sort_by(|a, b| {
        let ordering = match key {
            RiderSortKey::Username => {
                let a_name = a.username.as_deref().unwrap_or("");
                let b_name = b.username.as_deref().unwrap_or("");
                a_name.cmp(b_name)
            }
            RiderSortKey::UpdatedAt => {
                let a_ts = a.updated_at.map(|d| d.timestamp_millis()).unwrap_or(0);
                let b_ts = b.updated_at.map(|d| d.timestamp_millis()).unwrap_or(0);
                a_ts.cmp(&b_ts)
            }
        };
        direction.apply(ordering)
    });
}
