use std::sync::Arc;

use tracing::{error, info, warn};

use caredesk::auth::{
    user_key, AuthPolicy, AuthService, OtpEntry, PasswordHasher, ResetEntry, UserRecord,
};
use caredesk::schedule::{Reservation, ReservationService};
use caredesk::store::JsonFileStore;
use caredesk::web::{AppState, WebServer};
use caredesk::{Config, Result};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = caredesk::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        caredesk::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Fatal: {e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    config.validate()?;

    info!("caredesk {}", env!("CARGO_PKG_VERSION"));
    info!(data_dir = %config.storage.data_dir, "Opening stores");

    let storage = &config.storage;
    let users =
        JsonFileStore::<UserRecord>::open_list(storage.resolve(&storage.users_file), user_key)?;
    let resets = JsonFileStore::<ResetEntry>::open_map(storage.resolve(&storage.resets_file))?;
    let otps = JsonFileStore::<OtpEntry>::open_map(storage.resolve(&storage.otps_file))?;
    let reservations =
        JsonFileStore::<Reservation>::open_map(storage.resolve(&storage.reservations_file))?;

    if config.auth.demo_mode {
        warn!("Demo mode is on: one-time codes and reset tokens are returned to callers");
    }

    let auth = AuthService::new(
        Arc::new(users),
        Arc::new(resets),
        Arc::new(otps),
        PasswordHasher::new(config.auth.pbkdf2_iterations),
        AuthPolicy::from(&config.auth),
    );
    if let Some(admin) = auth.seed_admin()? {
        info!(
            email = %admin.email,
            "Created initial administrator; the default password must be changed on first login"
        );
    }

    let state = AppState::new(auth, ReservationService::new(Arc::new(reservations)));
    let server = WebServer::new(&config.server, &config.web, state)?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    server.run().await
}
