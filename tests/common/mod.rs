//! Test helpers for Web API tests.
//!
//! Builds the router over in-memory stores and a manual clock so tests can
//! seed data directly and move time forward.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::HeaderName;
use axum_test::TestServer;
use chrono::Utc;

use caredesk::auth::{
    AuthPolicy, AuthService, OtpEntry, PasswordHasher, ResetEntry, UserRecord,
};
use caredesk::clock::ManualClock;
use caredesk::config::WebConfig;
use caredesk::schedule::{Reservation, ReservationService};
use caredesk::store::{MemoryStore, Repository};
use caredesk::web::{create_router, AppState};

/// Password given to users created with [`TestApp::add_user`].
pub const PASSWORD: &str = "correct-horse";

/// Admin key configured by [`TestApp::with_admin_key`].
pub const ADMIN_KEY: &str = "test-admin-key";

/// Admin key header name.
pub fn admin_header() -> HeaderName {
    HeaderName::from_static("x-admin-key")
}

/// Running test application.
pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<MemoryStore<UserRecord>>,
    pub resets: Arc<MemoryStore<ResetEntry>>,
    pub otps: Arc<MemoryStore<OtpEntry>>,
    pub reservations: Arc<MemoryStore<Reservation>>,
    pub clock: Arc<ManualClock>,
    pub hasher: PasswordHasher,
}

impl TestApp {
    /// Default policy, no admin key, generous rate limit.
    pub fn new() -> Self {
        Self::build(test_web_config(), AuthPolicy::default())
    }

    /// Admin routes guarded by [`ADMIN_KEY`].
    pub fn with_admin_key() -> Self {
        let config = WebConfig {
            admin_key: ADMIN_KEY.to_string(),
            ..test_web_config()
        };
        Self::build(config, AuthPolicy::default())
    }

    /// Custom web config and policy.
    pub fn build(config: WebConfig, policy: AuthPolicy) -> Self {
        let users: Arc<MemoryStore<UserRecord>> = Arc::new(MemoryStore::new());
        let resets: Arc<MemoryStore<ResetEntry>> = Arc::new(MemoryStore::new());
        let otps: Arc<MemoryStore<OtpEntry>> = Arc::new(MemoryStore::new());
        let reservations: Arc<MemoryStore<Reservation>> = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let hasher = PasswordHasher::new(1_000);

        let auth = AuthService::new(
            users.clone(),
            resets.clone(),
            otps.clone(),
            hasher,
            policy,
        )
        .with_clock(clock.clone());
        let state = AppState::new(auth, ReservationService::new(reservations.clone()));

        let router = create_router(Arc::new(state), &config);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            users,
            resets,
            otps,
            reservations,
            clock,
            hasher,
        }
    }

    /// Store a user whose password is [`PASSWORD`].
    pub fn add_user(&self, id: &str, name: &str, email: &str) -> UserRecord {
        let mut user = UserRecord::new(id, name, email);
        user.set_credentials(self.hasher.hash(PASSWORD));
        self.users.put(id, user.clone()).unwrap();
        user
    }

    /// Store a user that has never logged in (no salt or hash).
    pub fn add_fresh_user(&self, id: &str, name: &str, email: &str) -> UserRecord {
        let user = UserRecord::new(id, name, email);
        self.users.put(id, user.clone()).unwrap();
        user
    }

    /// Current stored record.
    pub fn user(&self, id: &str) -> UserRecord {
        self.users.get(id).unwrap().expect("user exists")
    }
}

/// Web config used by tests.
pub fn test_web_config() -> WebConfig {
    WebConfig {
        cors_origins: vec![],
        admin_key: String::new(),
        login_rate_limit: 1_000,
        trust_proxy_headers: false,
    }
}
