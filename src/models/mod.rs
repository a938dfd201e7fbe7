pub mod admin;
pub mod booking;
pub mod driver;
pub mod feedback;
pub mod kyc;
pub mod rider;
pub mod sort;
pub mod subscription;
pub mod user;
pub mod vehicle;

pub use admin::*;
pub use booking::*;
pub use driver::*;
pub use feedback::*;
pub use kyc::*;
pub use rider::*;
pub use sort::*;
pub use subscription::*;
pub use user::*;
pub use vehicle::*;
