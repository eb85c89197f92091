//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

use crate::crypto::sha256;

/// Header carrying the client-reported visitor id (fingerprinting script).
///
/// The value is untrusted: it feeds risk signals, never authorization.
pub const VISITOR_ID_HEADER: &str = "x-visitor-id";

/// Client identity derived from request headers
///
/// Used to feed the device/IP fraud graphs. Everything here is
/// client-controlled evidence, not proof.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// Client-reported visitor id, if the fingerprint header was sent
    pub visitor_id: Option<String>,
    /// SHA-256 hash of the User-Agent header
    pub user_agent_hash: Option<[u8; 32]>,
}

impl ClientIdentity {
    /// Get IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Extract the client identity from request headers
///
/// Never fails: a client that sends no fingerprint header and no
/// User-Agent still gets an identity with those fields empty, and the
/// risk layer treats the absence itself as a signal.
pub fn extract_client_identity(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> ClientIdentity {
    let visitor_id = headers
        .get(VISITOR_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let user_agent_hash = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| sha256(ua.as_bytes()));

    ClientIdentity {
        ip: extract_client_ip(headers, direct_ip),
        visitor_id,
        user_agent_hash,
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // Check X-Forwarded-For header (first IP in the list)
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_identity_full() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );
        headers.insert(VISITOR_ID_HEADER, HeaderValue::from_static("fp-abc123"));

        let identity = extract_client_identity(&headers, None);
        assert_eq!(identity.visitor_id, Some("fp-abc123".to_string()));
        assert!(identity.user_agent_hash.is_some());
    }

    #[test]
    fn test_extract_identity_empty_headers() {
        let headers = HeaderMap::new();
        let identity = extract_client_identity(&headers, None);
        assert!(identity.visitor_id.is_none());
        assert!(identity.user_agent_hash.is_none());
        assert!(identity.ip.is_none());
    }

    #[test]
    fn test_blank_visitor_id_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(VISITOR_ID_HEADER, HeaderValue::from_static("   "));

        let identity = extract_client_identity(&headers, None);
        assert!(identity.visitor_id.is_none());
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }
}
