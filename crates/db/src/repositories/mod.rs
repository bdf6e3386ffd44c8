//! Repository layer: each table gets a zero-sized struct whose methods take
//! the pool (or a transaction) explicitly.

pub mod adventure_repo;
pub mod api_key_repo;
pub mod api_log_repo;
pub mod notification_repo;
pub mod rating_repo;
pub mod review_repo;
pub mod setting_repo;
pub mod statistic_repo;
pub mod tag_repo;
pub mod user_repo;

pub use adventure_repo::{AdventureRepo, RemovedAdventure};
pub use api_key_repo::ApiKeyRepo;
pub use api_log_repo::ApiLogRepo;
pub use notification_repo::NotificationRepo;
pub use rating_repo::RatingRepo;
pub use review_repo::ReviewRepo;
pub use setting_repo::SettingRepo;
pub use statistic_repo::StatisticRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
