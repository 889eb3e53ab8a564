//! HTTP server for caredesk.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{ServerConfig, WebConfig};
use crate::{CaredeskError, Result};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::router::{create_health_router, create_router_with_limiter};

/// HTTP server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(server: &ServerConfig, web: &WebConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| {
                CaredeskError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    server.host, server.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            web_config: web.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn bind(self) -> Result<(TcpListener, axum::Router)> {
        let limiter = Arc::new(RateLimitState::from_config(&self.web_config));
        let router = create_router_with_limiter(self.app_state, &self.web_config, limiter.clone())
            .merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        limiter.start_cleanup_task();
        tracing::info!("Web server listening on http://{}", local_addr);

        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthPolicy, AuthService, OtpEntry, PasswordHasher, ResetEntry, UserRecord};
    use crate::schedule::{Reservation, ReservationService};
    use crate::store::MemoryStore;

    fn test_state() -> AppState {
        let auth = AuthService::new(
            Arc::new(MemoryStore::<UserRecord>::new()),
            Arc::new(MemoryStore::<ResetEntry>::new()),
            Arc::new(MemoryStore::<OtpEntry>::new()),
            PasswordHasher::new(1_000),
            AuthPolicy::default(),
        );
        let reservations = Arc::new(MemoryStore::<Reservation>::new());
        AppState::new(auth, ReservationService::new(reservations))
    }

    fn local_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    #[test]
    fn test_web_server_new() {
        let server = WebServer::new(&local_config(), &WebConfig::default(), test_state()).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_web_server_rejects_bad_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            port: 4000,
        };
        let result = WebServer::new(&config, &WebConfig::default(), test_state());
        assert!(matches!(result, Err(CaredeskError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let server = WebServer::new(&local_config(), &WebConfig::default(), test_state()).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }
}
