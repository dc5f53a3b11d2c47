// src/main.rs
use std::sync::Arc;
use actix_web::{ web, App, HttpServer };
use env_logger::Env;
use governor::RateLimiter;
use log::{ error, info };
use serverboard::client::HttpSource;
use serverboard::config::Config;
use serverboard::handlers::RefreshLimiter;
use serverboard::poller::PollLoop;
use serverboard::storage::board::Board;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let source = HttpSource::new(&config).map_err(|e| {
        error!("Failed to build HTTP client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!(
        "Directory at {}, {} region overrides, default region {}",
        config.variant.directory_url(),
        config.regions.len(),
        config.regions.default_region()
    );

    if !config.trusted_proxies.is_empty() {
        info!("Honouring X-Forwarded-For from {} trusted proxy ranges", config.trusted_proxies.len());
    }

    // The board is created once and handed to the poll loop; handlers only read it.
    let board = Arc::new(Board::new(config.connect_port));
    let (poll_handle, _poll_task) = PollLoop::new(Arc::clone(&board), source, &config).spawn();

    let board = web::Data::from(board);
    let poll_handle = web::Data::new(poll_handle);
    let refresh_rate_limiter: web::Data<RefreshLimiter> =
        web::Data::new(RateLimiter::keyed(config.refresh_quota()));
    let bind = config.bind();
    let config = web::Data::new(config);

    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(board.clone())
            .app_data(poll_handle.clone())
            .app_data(refresh_rate_limiter.clone())
            .app_data(config.clone())
            .configure(serverboard::routes)
    })
        .bind(&bind)?
        .run().await
}
