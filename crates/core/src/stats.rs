//! Daily statistic counter names.
//!
//! Counters are incremented best-effort as side effects of user activity;
//! a failed increment must never fail the triggering request.

pub const STAT_LOGINS: &str = "logins";
pub const STAT_REGISTRATIONS: &str = "registrations";
pub const STAT_DOWNLOADS: &str = "downloads";
pub const STAT_UPLOADS: &str = "uploads";
