pub mod auth;
pub mod booking;
pub mod dashboard;
pub mod driver;
pub mod feedback;
pub mod rider;
pub mod subscription;
