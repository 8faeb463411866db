pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

use std::error::Error;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{middleware::Logger, web, App, HttpRequest, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::InvoiceService;
pub use config::AppConfig;
pub use db::{create_pool, DbPool};
pub use infrastructure::{DieselInvoiceRepository, InMemoryInvoiceRepository};

use domain::ports::InvoiceRepository;
use errors::AppError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The service as shared by every HTTP worker.
pub type AppService = InvoiceService<Box<dyn InvoiceRepository>>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Registers the invoice routes and extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{health, invoices};

    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .route("/health", web::get().to(health::health))
        .service(
            web::scope("/invoices")
                .route("", web::post().to(invoices::create_invoice))
                .route("", web::get().to(invoices::list_invoices))
                .route("/{id}", web::get().to(invoices::get_invoice))
                .route("/{id}", web::patch().to(invoices::update_invoice))
                .route("/{id}", web::delete().to(invoices::delete_invoice))
                .route("/{id}/mark-paid", web::post().to(invoices::mark_invoice_paid))
                .route("/{id}/print", web::get().to(invoices::print_invoice)),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: AppService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
