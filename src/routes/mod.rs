pub mod health;
pub mod keys;
pub mod limits;
pub mod query;
pub mod subscriptions;
pub mod tokens;
pub mod usage;
pub mod users;
