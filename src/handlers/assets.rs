// src/handlers/assets.rs
use std::collections::HashMap;
use actix_web::{ web, HttpResponse };
use lazy_static::lazy_static;
use log::debug;

// Stylesheet and icons referenced by the board page, compiled into the binary.
lazy_static! {
    static ref ASSETS: HashMap<&'static str, (&'static str, &'static str)> = {
        let mut assets = HashMap::new();
        assets.insert("css/style.css", ("text/css; charset=utf-8", include_str!("../../static/css/style.css")));
        assets.insert("img/copy.svg", ("image/svg+xml", include_str!("../../static/img/copy.svg")));
        assets.insert("img/us-west.svg", ("image/svg+xml", include_str!("../../static/img/us-west.svg")));
        assets.insert("img/eu-central.svg", ("image/svg+xml", include_str!("../../static/img/eu-central.svg")));
        assets
    };
}

pub async fn static_asset(path: web::Path<(String, String)>) -> HttpResponse {
    let (dir, file) = path.into_inner();
    let key = format!("{}/{}", dir, file);
    match ASSETS.get(key.as_str()) {
        Some((content_type, body)) => HttpResponse::Ok()
            .content_type(*content_type)
            .insert_header(("Cache-Control", "public, max-age=3600"))
            .body(*body),
        None => {
            debug!("No static asset {}", key);
            not_found().await
        }
    }
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body("<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Not found</title></head>\n<body><p>404 Not found! Please try again</p><a href=\"/\">Back to servers</a></body>\n</html>\n")
}
