pub mod auth;

pub use auth::AdminGuard;
