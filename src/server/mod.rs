//! actix-web front end for the dashboard
//!
//! One [`AppState`] is shared by every worker. It holds the catalog scanned
//! at startup and the process-wide [`ResultLoader`].

mod auth;
mod page;
mod routes;

use std::path::PathBuf;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::{Condition, Logger};
use actix_web::{web, App, HttpResponse, HttpServer, ResponseError};
use actix_web_httpauth::middleware::HttpAuthentication;
use serde_json::json;

use crate::catalog::{discover, CatalogEntry};
use crate::config::{AuthConfig, ServerConfig};
use crate::error::{DashboardError, Result};
use crate::loader::ResultLoader;

pub use auth::credentials_match;

/// Shared state behind every handler
#[derive(Debug)]
pub struct AppState {
    pub results_dir: PathBuf,
    pub catalog: Vec<CatalogEntry>,
    pub loader: ResultLoader,
}

impl AppState {
    /// Scan `results_dir` and start with an empty cache
    pub fn new(results_dir: PathBuf) -> Self {
        let catalog = discover(&results_dir);
        Self {
            results_dir,
            catalog,
            loader: ResultLoader::new(),
        }
    }

    /// Look up a selected file. Only catalogued paths are served.
    pub fn entry(&self, key: &str) -> Result<&CatalogEntry> {
        self.catalog
            .iter()
            .find(|e| e.key() == key)
            .ok_or_else(|| DashboardError::NotFound {
                path: key.to_string(),
            })
    }
}

impl ResponseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::NotFound { .. } => StatusCode::NOT_FOUND,
            DashboardError::Schema { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Validation { .. } | DashboardError::InvalidInput { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("Request rejected: {}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}

/// Register the page and API routes. `/healthz` is mounted separately so it
/// stays outside the auth gate.
pub fn configure(cfg: &mut web::ServiceConfig) {
    routes::configure(cfg);
}

/// Assemble the application: request logging, `/healthz` in the open, and
/// everything else behind Basic Auth when `auth` is set
pub fn build_app(
    state: web::Data<AppState>,
    auth: Option<web::Data<AuthConfig>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let auth_enabled = auth.is_some();
    let mut app = App::new().app_data(state);
    if let Some(auth) = auth {
        app = app.app_data(auth);
    }
    app.wrap(Logger::new("%r %s %Dms"))
        .route("/healthz", web::get().to(routes::healthz))
        .service(
            web::scope("")
                .wrap(Condition::new(
                    auth_enabled,
                    HttpAuthentication::basic(auth::validator),
                ))
                .configure(configure),
        )
}

/// Bind and run the server until it is stopped
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    if !config.results_dir.exists() {
        log::warn!(
            "Results directory {} does not exist; no comparisons will be listed",
            config.results_dir.display()
        );
    }

    let state = web::Data::new(AppState::new(config.results_dir.clone()));
    log::info!(
        "Loaded catalog of {} comparisons from {}",
        state.catalog.len(),
        config.results_dir.display()
    );

    if let Some(auth) = &config.auth {
        log_auth(auth);
    }
    let auth = config.auth.clone().map(web::Data::new);

    let (host, port) = config.bind_addr();
    log::info!("Starting dashboard at http://{}:{}", host, port);

    let mut server = HttpServer::new(move || build_app(state.clone(), auth.clone()));
    if config.debug {
        server = server.workers(1);
    }

    server.bind((host, port))?.run().await
}

fn log_auth(auth: &AuthConfig) {
    if auth.generated {
        log::warn!(
            "DASH_PASSWORD not set. Generated password for user '{}': {}",
            auth.username,
            auth.password
        );
        log::warn!("Set DASH_PASSWORD to use a fixed password");
    } else {
        log::info!("Basic Auth enabled for user '{}'", auth.username);
    }
}
