use std::io;

use dotenvy::dotenv;
use invoice_ledger::domain::ports::InvoiceRepository;
use invoice_ledger::{
    build_server, create_pool, run_migrations, AppConfig, AppService, DieselInvoiceRepository,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    let pool = create_pool(&config.database_url, config.pool_size).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let repo: Box<dyn InvoiceRepository> = Box::new(DieselInvoiceRepository::new(pool));
    let service = AppService::new(repo);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(service, &config.host, config.port)?.await
}
