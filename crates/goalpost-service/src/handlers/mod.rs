//! HTTP request handlers.

pub mod credits;
pub mod events;
pub mod fields;
pub mod health;
pub mod sessions;
pub mod users;
