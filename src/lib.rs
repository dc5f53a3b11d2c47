// src/lib.rs
pub mod client;
pub mod config;
pub mod handlers;
pub mod models;
pub mod poller;
pub mod render;
pub mod storage;
pub mod utils;

use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index::index))
        .route("/health", web::get().to(handlers::index::health))
        .route("/api/board", web::get().to(handlers::board::get_board))
        .route("/refresh", web::post().to(handlers::refresh::manual_refresh))
        .route("/{dir:css|img}/{file}", web::get().to(handlers::assets::static_asset))
        .default_service(web::to(handlers::assets::not_found));
}
