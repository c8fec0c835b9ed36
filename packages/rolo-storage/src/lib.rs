pub mod accounts;
pub mod connections;
pub mod contacts;
pub mod db;
pub mod models;
pub mod outbox;
pub mod qdrant;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
