//! Email notification for triggered alerts.
//!
//! Templates live in the database and use `{{placeholder}}` substitution.
//! When no SMTP transport is configured the [`Notifier`] degrades to a
//! no-op and triggering an alert never fails because of mail.

pub mod email;
pub mod notifier;
pub mod template;

pub use email::{EmailSender, SmtpConfig};
pub use notifier::Notifier;
