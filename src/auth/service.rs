//! Login, lockout, second factor and password reset.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use super::notifier::{LogNotifier, Notifier};
use super::otp::{generate_code, OtpEntry};
use super::password::{validate_password, Credentials, PasswordHasher};
use super::reset::{generate_token, ResetEntry};
use super::user::{PublicUser, UserPatch, UserRecord, UserSummary};
use crate::clock::{Clock, SystemClock};
use crate::config::{AuthConfig, MAX_TTL_SECS};
use crate::store::Repository;
use crate::{CaredeskError, Result};

/// Tunables for the authentication flow.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    /// Consecutive failures that trigger a lockout.
    pub max_failed_attempts: u32,
    /// How long a lockout lasts.
    pub lockout: Duration,
    /// One-time code lifetime.
    pub otp_ttl: Duration,
    /// Reset token lifetime.
    pub reset_ttl: Duration,
    /// Echo codes and tokens back to the caller.
    pub demo_mode: bool,
    /// Apply the length policy to newly chosen passwords.
    pub enforce_password_policy: bool,
    /// Password given to records that have no credentials yet.
    pub default_password: String,
    /// Name of the administrator created on an empty store.
    pub seed_admin_name: String,
    /// Email of the administrator created on an empty store.
    pub seed_admin_email: String,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for AuthPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            max_failed_attempts: config.max_failed_attempts,
            lockout: ttl(config.lockout_secs),
            otp_ttl: ttl(config.otp_ttl_secs),
            reset_ttl: ttl(config.reset_ttl_secs),
            demo_mode: config.demo_mode,
            enforce_password_policy: config.enforce_password_policy,
            default_password: config.default_password.clone(),
            seed_admin_name: config.seed_admin_name.clone(),
            seed_admin_email: config.seed_admin_email.clone(),
        }
    }
}

/// Lifetime in seconds, capped at [`MAX_TTL_SECS`].
fn ttl(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}

/// `from + ttl`, or a configuration error if that leaves chrono's range.
fn deadline(from: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    from.checked_add_signed(ttl).ok_or_else(|| {
        CaredeskError::Config(format!("lifetime of {}s is out of range", ttl.num_seconds()))
    })
}

/// Result of a password check that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A one-time code was issued; the caller must verify it next.
    Challenge {
        /// User the code belongs to.
        user_id: String,
        /// The code itself, only in demo mode.
        demo_code: Option<String>,
    },
    /// The password is correct but must be replaced before continuing.
    MustChangePassword {
        /// User who must set a new password.
        user_id: String,
    },
    /// Fully authenticated.
    Authenticated(PublicUser),
}

/// Result of a reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// A token was stored and handed to the notifier.
    Issued {
        /// The token itself, only in demo mode.
        demo_token: Option<String>,
    },
    /// No account has that email.
    Unknown,
}

/// Authentication service over the user, reset and OTP stores.
pub struct AuthService {
    users: Arc<dyn Repository<UserRecord>>,
    resets: Arc<dyn Repository<ResetEntry>>,
    otps: Arc<dyn Repository<OtpEntry>>,
    hasher: PasswordHasher,
    policy: AuthPolicy,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    /// Create a service using the system clock and the log notifier.
    pub fn new(
        users: Arc<dyn Repository<UserRecord>>,
        resets: Arc<dyn Repository<ResetEntry>>,
        otps: Arc<dyn Repository<OtpEntry>>,
        hasher: PasswordHasher,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            users,
            resets,
            otps,
            hasher,
            policy,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Use a different time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different delivery channel.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Active policy.
    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    fn check_new_password(&self, password: &str) -> Result<()> {
        if self.policy.enforce_password_policy {
            validate_password(password)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Find a user by email, falling back to name. Both ignore case.
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>> {
        let users: Vec<UserRecord> = self.users.list()?.into_iter().map(|(_, u)| u).collect();
        if let Some(user) = users.iter().find(|u| u.has_email(identifier)) {
            return Ok(Some(user.clone()));
        }
        Ok(users.into_iter().find(|u| u.has_name(identifier)))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .list()?
            .into_iter()
            .map(|(_, u)| u)
            .find(|u| u.has_email(email)))
    }

    // ------------------------------------------------------------------
    // Login
    // ------------------------------------------------------------------

    /// Check a name-or-email and password.
    pub fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CaredeskError::Missing("identifier"));
        }
        if password.is_empty() {
            return Err(CaredeskError::Missing("password"));
        }

        let mut user = self.find_by_identifier(identifier)?.ok_or_else(|| {
            warn!(identifier = %identifier, "Login failed: user not found");
            CaredeskError::UserNotFound
        })?;

        let now = self.clock.now();
        if let Some(until) = user.locked_until {
            if until > now {
                warn!(user_id = %user.id, locked_until = %until, "Login blocked: account locked");
                return Err(CaredeskError::Locked { until });
            }
            debug!(user_id = %user.id, "Lockout expired, clearing");
            user.clear_lockout();
        }

        let credentials = match user.credentials() {
            Some(credentials) => credentials,
            None => self.seed_credentials(&mut user),
        };

        if !self.hasher.verify(password, &credentials)? {
            user.failed_attempts += 1;
            if user.failed_attempts >= self.policy.max_failed_attempts {
                let until = deadline(now, self.policy.lockout)?;
                user.locked_until = Some(until);
                warn!(
                    user_id = %user.id,
                    failed_attempts = user.failed_attempts,
                    locked_until = %until,
                    "Account locked after repeated failures"
                );
            } else {
                warn!(
                    user_id = %user.id,
                    failed_attempts = user.failed_attempts,
                    "Login failed: wrong password"
                );
            }
            self.users.put(&user.id, user.clone())?;
            return Err(CaredeskError::InvalidCredentials);
        }

        user.clear_lockout();
        self.users.put(&user.id, user.clone())?;

        if user.two_factor {
            let code = self.issue_otp(&user)?;
            info!(user_id = %user.id, "Password accepted, second factor required");
            return Ok(LoginOutcome::Challenge {
                user_id: user.id,
                demo_code: self.policy.demo_mode.then_some(code),
            });
        }

        if user.must_change_password {
            info!(user_id = %user.id, "Password accepted, change required");
            return Ok(LoginOutcome::MustChangePassword { user_id: user.id });
        }

        info!(user_id = %user.id, "Login succeeded");
        Ok(LoginOutcome::Authenticated(user.public()))
    }

    /// Give a credential-less record the default password.
    fn seed_credentials(&self, user: &mut UserRecord) -> Credentials {
        info!(user_id = %user.id, "Seeding default credentials");
        let credentials = self.hasher.hash(&self.policy.default_password);
        user.set_credentials(credentials.clone());
        user.must_change_password = true;
        credentials
    }

    // ------------------------------------------------------------------
    // Second factor
    // ------------------------------------------------------------------

    /// Store a fresh code for `user`, replacing any previous one.
    fn issue_otp(&self, user: &UserRecord) -> Result<String> {
        let code = generate_code();
        let entry = OtpEntry {
            code: code.clone(),
            expires_at: deadline(self.clock.now(), self.policy.otp_ttl)?,
        };
        self.otps.put(&user.id, entry)?;
        self.notifier.send_otp(user, &code)?;
        Ok(code)
    }

    /// Check a one-time code. The code is consumed on success.
    ///
    /// An expired code stays on file until it is replaced by the next login.
    pub fn verify_otp(&self, user_id: &str, code: &str) -> Result<()> {
        let user_id = user_id.trim();
        let code = code.trim();
        if user_id.is_empty() {
            return Err(CaredeskError::Missing("userId"));
        }
        if code.is_empty() {
            return Err(CaredeskError::Missing("code"));
        }

        let entry = self.otps.get(user_id)?.ok_or(CaredeskError::NoOtp)?;
        if entry.is_expired(self.clock.now()) {
            warn!(user_id = %user_id, "One-time code expired");
            return Err(CaredeskError::Expired);
        }
        if entry.code != code {
            warn!(user_id = %user_id, "One-time code mismatch");
            return Err(CaredeskError::Invalid);
        }

        self.otps.remove(user_id)?;
        info!(user_id = %user_id, "Second factor verified");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Password reset
    // ------------------------------------------------------------------

    /// Start a reset for the account with `email`.
    pub fn request_reset(&self, email: &str) -> Result<ResetOutcome> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CaredeskError::Missing("email"));
        }

        let Some(user) = self.find_by_email(email)? else {
            debug!(email = %email, "Reset requested for unknown email");
            return Ok(ResetOutcome::Unknown);
        };

        let token = generate_token();
        let entry = ResetEntry {
            email: user.email.clone(),
            expires_at: deadline(self.clock.now(), self.policy.reset_ttl)?,
        };
        self.resets.put(&token, entry)?;
        self.notifier.send_reset_token(&user.email, &token)?;

        Ok(ResetOutcome::Issued {
            demo_token: self.policy.demo_mode.then_some(token),
        })
    }

    fn lookup_token(&self, token: &str) -> Result<ResetEntry> {
        if token.is_empty() {
            return Err(CaredeskError::Missing("token"));
        }
        let entry = self.resets.get(token)?.ok_or(CaredeskError::InvalidToken)?;
        if entry.is_expired(self.clock.now()) {
            return Err(CaredeskError::Expired);
        }
        Ok(entry)
    }

    /// Check a reset token without consuming it. Returns the account email.
    pub fn verify_token(&self, token: &str) -> Result<String> {
        self.lookup_token(token.trim()).map(|entry| entry.email)
    }

    /// Set a new password using a reset token. The token is single-use.
    pub fn reset(&self, token: &str, new_password: &str) -> Result<()> {
        let token = token.trim();
        if new_password.is_empty() {
            return Err(CaredeskError::Missing("password"));
        }
        let entry = self.lookup_token(token)?;
        self.check_new_password(new_password)?;

        let mut user = self.find_by_email(&entry.email)?.ok_or_else(|| {
            warn!(email = %entry.email, "Reset token points at a missing account");
            CaredeskError::UserNotFound
        })?;

        // Consume the token first so a failed user write cannot leave it reusable.
        self.resets.remove(token)?;
        user.set_credentials(self.hasher.hash(new_password));
        user.clear_lockout();
        user.must_change_password = false;
        self.users.put(&user.id, user.clone()).inspect_err(|e| {
            error!(user_id = %user.id, error = %e, "Reset token consumed but password not saved");
        })?;

        info!(user_id = %user.id, "Password reset via token");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Set a password on behalf of a user found by email or id.
    pub fn set_password(
        &self,
        identifier: &str,
        password: &str,
        must_change_password: Option<bool>,
    ) -> Result<()> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CaredeskError::Missing("identifier"));
        }
        if password.is_empty() {
            return Err(CaredeskError::Missing("password"));
        }
        self.check_new_password(password)?;

        let user = match self.find_by_email(identifier)? {
            Some(user) => user,
            None => self
                .users
                .get(identifier)?
                .ok_or(CaredeskError::UserNotFound)?,
        };

        let credentials = self.hasher.hash(password);
        self.users.patch(&user.id, &mut |u| {
            u.set_credentials(credentials.clone());
            u.clear_lockout();
            if let Some(flag) = must_change_password {
                u.must_change_password = flag;
            }
        })?;

        info!(user_id = %user.id, ?must_change_password, "Password set by administrator");
        Ok(())
    }

    /// Replace the password on first login and clear the change requirement.
    pub fn first_login(&self, user_id: &str, password: &str) -> Result<()> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(CaredeskError::Missing("userId"));
        }
        if password.is_empty() {
            return Err(CaredeskError::Missing("password"));
        }
        self.check_new_password(password)?;

        let credentials = self.hasher.hash(password);
        self.users
            .patch(user_id, &mut |u| {
                u.set_credentials(credentials.clone());
                u.clear_lockout();
                u.must_change_password = false;
            })?
            .ok_or(CaredeskError::UserNotFound)?;

        info!(user_id = %user_id, "First-login password set");
        Ok(())
    }

    /// Toggle the second factor and/or lift a lockout.
    pub fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<UserSummary> {
        if id.trim().is_empty() {
            return Err(CaredeskError::Missing("id"));
        }
        let updated = self
            .users
            .patch(id, &mut |u| patch.apply(u))?
            .ok_or(CaredeskError::UserNotFound)?;

        info!(
            user_id = %id,
            two_factor = ?patch.two_factor,
            reset_lock = ?patch.reset_lock,
            "User updated by administrator"
        );
        Ok(updated.summary())
    }

    /// All accounts, as shown to administrators.
    pub fn list_users(&self) -> Result<Vec<UserSummary>> {
        Ok(self
            .users
            .list()?
            .into_iter()
            .map(|(_, u)| u.summary())
            .collect())
    }

    /// Create the configured administrator if there are no users at all.
    pub fn seed_admin(&self) -> Result<Option<UserSummary>> {
        if !self.users.list()?.is_empty() {
            return Ok(None);
        }

        let mut admin = UserRecord::new(
            uuid::Uuid::new_v4().to_string(),
            &self.policy.seed_admin_name,
            &self.policy.seed_admin_email,
        );
        admin.set_credentials(self.hasher.hash(&self.policy.default_password));
        admin.must_change_password = true;
        self.users.put(&admin.id, admin.clone())?;

        info!(user_id = %admin.id, email = %admin.email, "Seeded administrator account");
        Ok(Some(admin.summary()))
    }
}
