pub mod boosts;
pub mod person;
pub mod query;
