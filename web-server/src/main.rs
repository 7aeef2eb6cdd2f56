// Web Server - main.rs
// emberhollow-site/web-server/src/main.rs
mod api;
mod client;
mod error;
mod middleware;
mod static_files;
#[cfg(test)]
mod test_support;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};

use common::{setup_tracing, Config};

use crate::api::public::PublicGateway;
use crate::client::transport::{HttpTransport, Transport};
use crate::client::workspace::WorkspaceRegistry;
use crate::middleware::auth_gate::AuthGate;
use crate::middleware::rate_limiter::RateLimiter;
use crate::static_files::StaticBundle;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();

    tracing::info!("Starting Web Server on {}", server_addr);

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.content_api_url));

    let registry = web::Data::new(
        WorkspaceRegistry::new(transport.clone()).with_ttl(config.session.ttl_hours * 3600),
    );
    let gateway = web::Data::new(PublicGateway::new(transport));

    let session_secret = config.session.secret.clone();
    let bundle = StaticBundle::from_config(&config.static_files);
    let config_data = web::Data::new(config);

    // Hourly sweep of admin workspaces whose sessions have gone idle
    {
        let registry = registry.clone();
        actix_web::rt::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = registry.cleanup_expired();
                if removed > 0 {
                    tracing::info!("Dropped {} expired admin workspaces", removed);
                }
            }
        });
    }

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(registry.clone())
            .app_data(gateway.clone())
            // The last wrap runs first: rate limiting happens before session checks
            .wrap(AuthGate::new(session_secret.as_bytes()))
            .wrap(RateLimiter::new(vec![
                "/api/contact".to_string(),
                "/auth/".to_string(),
            ]))
            .configure(api::auth::configure)
            .configure(api::admin::configure)
            .configure(api::public::configure)
            .configure(|cfg| static_files::configure(cfg, bundle.clone()))
    })
    .bind(&server_addr)?
    .run()
    .await
}
