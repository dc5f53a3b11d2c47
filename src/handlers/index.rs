// src/handlers/index.rs
use actix_web::{ web, HttpResponse };
use crate::config::Config;
use crate::render::page::render_page;
use crate::storage::board::Board;

pub async fn index(
    board: web::Data<Board>,
    config: web::Data<Config>
) -> HttpResponse {
    let html = render_page(&board.snapshot(), config.poll_interval.as_secs());
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().content_type("application/json").body("{\"status\": \"ok\"}")
}
