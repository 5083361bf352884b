//! Client identity derivation.
//!
//! The identity scopes a client's counters within a namespace. It is taken,
//! first match wins, from:
//!
//! 1. the `X-RateLimit-Id` header, verbatim, when present and non-empty
//!    (per-API-key limiting)
//! 2. the first entry of `X-Forwarded-For`, trimmed (original client in a
//!    proxy chain)
//! 3. the transport peer address
//! 4. the literal `"unknown"`
//!
//! No other headers are consulted and values are not validated. Both
//! headers are client-controlled, so a client talking to the service
//! directly can choose its own identity; deploy behind a proxy that
//! overwrites them. Identities are opaque and may contain `:` or other
//! characters with meaning to a key-value store.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::net::{IpAddr, SocketAddr};

/// Explicit client identifier header
pub const RATE_LIMIT_ID_HEADER: &str = "x-ratelimit-id";

/// Proxy chain header
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity used when nothing identifies the client
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the client identity from headers and the peer address
pub fn identify(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    if let Some(id) = headers
        .get(RATE_LIMIT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return id.to_string();
    }

    if let Some(first) = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.split(',').next())
    {
        return first.trim().to_string();
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Derive the client identity of an axum request.
///
/// The peer address comes from `ConnectInfo<SocketAddr>`, present when the
/// server was started with `into_make_service_with_connect_info`.
pub fn identify_request<B>(request: &Request<B>) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    identify(request.headers(), peer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn peer() -> Option<IpAddr> {
        Some("10.1.2.3".parse().unwrap())
    }

    fn request(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_explicit_id_wins_over_forwarded_for() {
        let req = request(&[("X-RateLimit-Id", "abc"), ("X-Forwarded-For", "1.2.3.4")]);
        assert_eq!(identify(req.headers(), peer()), "abc");
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let req = request(&[("X-Forwarded-For", "9.9.9.9, 10.0.0.1")]);
        assert_eq!(identify(req.headers(), peer()), "9.9.9.9");
    }

    #[test]
    fn test_forwarded_for_is_trimmed() {
        let req = request(&[("X-Forwarded-For", "  203.0.113.50  ,10.0.0.1")]);
        assert_eq!(identify(req.headers(), peer()), "203.0.113.50");
    }

    #[test]
    fn test_empty_explicit_id_falls_through() {
        let req = request(&[("X-RateLimit-Id", ""), ("X-Forwarded-For", "1.2.3.4")]);
        assert_eq!(identify(req.headers(), peer()), "1.2.3.4");
    }

    #[test]
    fn test_empty_forwarded_for_falls_back_to_peer() {
        let req = request(&[("X-Forwarded-For", "")]);
        assert_eq!(identify(req.headers(), peer()), "10.1.2.3");
    }

    #[test]
    fn test_peer_address() {
        let req = request(&[]);
        assert_eq!(identify(req.headers(), peer()), "10.1.2.3");
    }

    #[test]
    fn test_unknown_without_connection_info() {
        let req = request(&[]);
        assert_eq!(identify(req.headers(), None), "unknown");
        assert_eq!(identify_request(&req), "unknown");
    }

    #[test]
    fn test_other_headers_ignored() {
        let req = request(&[("X-Real-IP", "192.168.1.1"), ("X-API-Key", "k")]);
        assert_eq!(identify(req.headers(), None), "unknown");
    }

    #[test]
    fn test_identify_request_reads_connect_info() {
        let mut req = request(&[]);
        let addr: SocketAddr = "192.0.2.7:51234".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(identify_request(&req), "192.0.2.7");
    }

    #[test]
    fn test_identify_is_deterministic() {
        let req = request(&[("X-Forwarded-For", "2001:db8::1, 10.0.0.1")]);
        let first = identify(req.headers(), peer());
        let second = identify(req.headers(), peer());
        assert_eq!(first, second);
        assert_eq!(first, "2001:db8::1");
    }
}
