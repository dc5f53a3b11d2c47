// src/handlers/board.rs
use actix_web::{ web, HttpResponse };
use crate::storage::board::Board;

/// JSON copy of the table and refresh control.
pub async fn get_board(board: web::Data<Board>) -> HttpResponse {
    HttpResponse::Ok().json(board.snapshot())
}
