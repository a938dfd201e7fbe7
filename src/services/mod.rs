pub mod assemble;
pub mod fetch;
pub mod jwt;

pub use jwt::JwtService;
