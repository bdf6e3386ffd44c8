//! Row models and DTOs, one module per table group.

pub mod adventure;
pub mod api_key;
pub mod api_log;
pub mod notification;
pub mod rating;
pub mod review;
pub mod setting;
pub mod statistic;
pub mod tag;
pub mod user;
