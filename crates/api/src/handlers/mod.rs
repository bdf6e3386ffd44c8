//! HTTP request handlers, grouped by resource.

pub mod admin;
pub mod adventures;
pub mod auth;
pub mod external;
pub mod moderation;
pub mod notifications;
pub mod tags;
