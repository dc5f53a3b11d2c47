// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use std::net::IpAddr;
use ipnetwork::IpNetwork;
use log::debug;
use std::fmt;

#[derive(Debug)]
pub enum RequestError {
    MissingPeerIP,
    RateLimitExceeded,
    PollerUnavailable,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeerIP => write!(f, "Failed to extract client IP"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::PollerUnavailable => write!(f, "Refresh loop is not running"),
        }
    }
}

impl ResponseError for RequestError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::RateLimitExceeded => {
                HttpResponse::TooManyRequests().body(self.to_string())
            }
            Self::PollerUnavailable => {
                HttpResponse::ServiceUnavailable().body(self.to_string())
            }
            Self::MissingPeerIP => HttpResponse::BadRequest().body(self.to_string())
        }
    }
}

/// Client address for rate limiting. Forwarded headers are only honoured when
/// the connection comes from one of `trusted_proxies`; anyone else is keyed by
/// their peer address.
pub fn extract_client_ip(req: &HttpRequest, trusted_proxies: &[IpNetwork]) -> Result<IpAddr, RequestError> {
    let peer_addr = match req.peer_addr() {
        Some(addr) => addr.ip(),
        None => return Err(RequestError::MissingPeerIP)
    };
    if !trusted_proxies.iter().any(|net| net.contains(peer_addr)) {
        return Ok(peer_addr);
    }

    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(ip_str) = forwarded_for.to_str() {
            if let Some(first_ip) = ip_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    debug!("Using X-Forwarded-For from proxy {}: {}", peer_addr, ip);
                    return Ok(ip);
                }
            }
        }
    }

    Ok(peer_addr)
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
        assert_eq!(escape_html("ctf_2fort"), "ctf_2fort");
    }

    fn proxies() -> Vec<IpNetwork> {
        vec!["10.0.0.0/8".parse().unwrap()]
    }

    #[test]
    fn forwarded_header_used_behind_trusted_proxy() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
            .peer_addr("10.1.2.3:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(extract_client_ip(&req, &proxies()).unwrap().to_string(), "203.0.113.9");
    }

    #[test]
    fn forwarded_header_ignored_from_untrusted_peer() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9"))
            .peer_addr("198.51.100.7:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(extract_client_ip(&req, &proxies()).unwrap().to_string(), "198.51.100.7");
        assert_eq!(extract_client_ip(&req, &[]).unwrap().to_string(), "198.51.100.7");
    }

    #[test]
    fn falls_back_to_peer_address() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.5:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(extract_client_ip(&req, &proxies()).unwrap().to_string(), "10.0.0.5");

        let no_peer = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9"))
            .to_http_request();
        assert!(matches!(extract_client_ip(&no_peer, &proxies()), Err(RequestError::MissingPeerIP)));
    }
}
