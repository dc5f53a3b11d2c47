// src/handlers/refresh.rs
use actix_web::{ web, HttpResponse, HttpRequest };
use log::{ error, info };
use crate::config::Config;
use crate::handlers::RefreshLimiter;
use crate::poller::PollHandle;
use crate::utils::{ extract_client_ip, RequestError };

pub async fn manual_refresh(
    req: HttpRequest,
    poller: web::Data<PollHandle>,
    rate_limiter: web::Data<RefreshLimiter>,
    config: web::Data<Config>
) -> Result<HttpResponse, RequestError> {
    let client_ip = extract_client_ip(&req, &config.trusted_proxies)?;

    if rate_limiter.check_key(&client_ip).is_err() {
        error!("Rate limit exceeded for manual refresh for ip: {}", client_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    poller.refresh().map_err(|_| RequestError::PollerUnavailable)?;
    info!("Manual refresh queued by {}", client_ip);
    Ok(HttpResponse::Accepted().finish())
}
