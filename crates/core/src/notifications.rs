//! Notification type constants and message builders.
//!
//! Types must match the values accepted by the `notifications` table check
//! constraint.

/// A new submission needs moderator attention.
pub const TYPE_MODERATION: &str = "moderation";

/// The author's submission was approved.
pub const TYPE_APPROVAL: &str = "approval";

/// The author's submission was rejected.
pub const TYPE_REJECTION: &str = "rejection";

/// Message sent to every moderator when a submission arrives.
pub fn moderation_message(adventure_name: &str) -> String {
    format!("New adventure '{adventure_name}' needs approval")
}

/// Message sent to the author on approval.
pub fn approval_message(adventure_name: &str) -> String {
    format!("Your adventure '{adventure_name}' has been approved")
}

/// Message sent to the author on rejection.
pub fn rejection_message(adventure_name: &str) -> String {
    format!("Your adventure '{adventure_name}' has been rejected")
}
