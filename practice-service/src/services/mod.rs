pub mod access;
pub mod billing;
pub mod database;
pub mod jwt;

pub use access::Identity;
pub use database::MongoDb;
pub use jwt::JwtService;
