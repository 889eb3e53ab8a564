//! Out-of-band delivery of one-time codes and reset tokens.

use tracing::info;

use super::user::UserRecord;
use crate::Result;

/// Channel that gets secrets to the account holder.
pub trait Notifier: Send + Sync {
    /// Deliver a login code to `user`.
    fn send_otp(&self, user: &UserRecord, code: &str) -> Result<()>;

    /// Deliver a password-reset token to `email`.
    fn send_reset_token(&self, email: &str, token: &str) -> Result<()>;
}

/// Records deliveries in the log without the secret itself.
///
/// Stand-in until a mail or SMS gateway is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_otp(&self, user: &UserRecord, _code: &str) -> Result<()> {
        info!(user_id = %user.id, "One-time code issued");
        Ok(())
    }

    fn send_reset_token(&self, email: &str, _token: &str) -> Result<()> {
        info!(email = %email, "Password reset token issued");
        Ok(())
    }
}
