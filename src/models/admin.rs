use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Legacy admin credential record. Passwords in `admin_auth` are stored
/// as written by the old console; the login route compares by equality.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminAccount {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// What the dashboard keeps client-side after login. The bearer token
/// is what actually gates admin calls; this blob is display data.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct Session {
    pub id: String,
    pub email: String,
    #[serde(rename = "loginTime")]
    pub login_time: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}
