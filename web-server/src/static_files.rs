// web-server/src/static_files.rs
use actix_files::{Files, NamedFile};
use actix_web::{web, Error, HttpRequest, HttpResponse, Result};
use std::path::PathBuf;

use common::StaticFilesConfig;

// Resolved paths for the marketing bundle
#[derive(Clone)]
pub struct StaticBundle {
    pub root_path: PathBuf,
    pub index_file: String,
}

impl StaticBundle {
    pub fn from_config(config: &StaticFilesConfig) -> Self {
        Self {
            root_path: PathBuf::from(&config.path),
            index_file: config.index.clone(),
        }
    }
}

// Async handler function for SPA fallback
async fn spa_index(req: HttpRequest, bundle: web::Data<StaticBundle>) -> Result<HttpResponse, Error> {
    // Never serve the shell for API, auth, or admin routes
    let path = req.path();
    if path.starts_with("/api/") || path.starts_with("/auth/") || path.starts_with("/admin") {
        return Ok(HttpResponse::NotFound().finish());
    }

    // For all other unmatched routes, serve the index file (SPA support)
    let index_path = bundle.root_path.join(&bundle.index_file);
    let file = NamedFile::open_async(index_path).await?;
    Ok(file.into_response(&req))
}

// Configure static file serving with SPA support
pub fn configure(cfg: &mut web::ServiceConfig, bundle: StaticBundle) {
    // Store bundle paths in app data
    let bundle_data = web::Data::new(bundle.clone());

    // Serve static files from the configured directory
    cfg.app_data(bundle_data)
        .service(
            Files::new("/", &bundle.root_path)
                .index_file(&bundle.index_file)
                .prefer_utf8(true)
                .use_etag(true)
                .use_last_modified(true),
        )
        // Add a catch-all route for SPA support with the lowest priority
        .default_service(web::route().to(spa_index));
}
