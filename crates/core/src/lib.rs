//! Domain logic for the adventure store: package inspection, version
//! ordering, submission validation rules, API-key utilities, and the shared
//! error taxonomy.
//!
//! This crate has zero internal dependencies so it can be used by the
//! API/repository layer and any future CLI tooling.

pub mod api_keys;
pub mod error;
pub mod hashing;
pub mod notifications;
pub mod package;
pub mod roles;
pub mod stats;
pub mod submission;
pub mod types;
pub mod version;
