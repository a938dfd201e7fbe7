pub mod bson;
pub mod response;
pub mod text;

pub use response::*;
