//! Client identity and request origin extraction from HTTP metadata.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Returns the caller's IP as a string, for rate-limit keys and log events.
///
/// By default this is the peer socket address. When `behind_proxy` is set,
/// the first `X-Forwarded-For` entry is preferred, then `X-Real-IP` — only
/// enable that behind a trusted reverse proxy, since both headers are
/// caller-controlled otherwise.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
        if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
            let real_ip = real_ip.trim();
            if !real_ip.is_empty() {
                return real_ip.to_string();
            }
        }
    }

    peer.ip().to_string()
}

/// Reconstructs the externally visible base URL from the Host and
/// `X-Forwarded-Proto` headers, for building short URLs in responses.
pub fn base_url(headers: &HeaderMap) -> Option<String> {
    let host = headers.get("host").and_then(|v| v.to_str().ok())?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    Some(format!("{proto}://{host}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "203.0.113.9:44512".parse().unwrap()
    }

    #[test]
    fn test_peer_address_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));

        assert_eq!(client_ip(&headers, peer(), false), "203.0.113.9");
    }

    #[test]
    fn test_forwarded_for_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.4, 10.0.0.1"),
        );

        assert_eq!(client_ip(&headers, peer(), true), "198.51.100.4");
    }

    #[test]
    fn test_real_ip_fallback_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));

        assert_eq!(client_ip(&headers, peer(), true), "198.51.100.7");
    }

    #[test]
    fn test_behind_proxy_without_headers_uses_peer() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer(), true), "203.0.113.9");
    }

    #[test]
    fn test_base_url_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("sho.rt"));
        assert_eq!(base_url(&headers).unwrap(), "http://sho.rt");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(base_url(&headers).unwrap(), "https://sho.rt");
    }

    #[test]
    fn test_base_url_requires_host() {
        assert!(base_url(&HeaderMap::new()).is_none());
    }
}
