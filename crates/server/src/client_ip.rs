//! Submitter IP resolution.
//!
//! Forwarded headers are trusted as-is; the server is expected to sit behind
//! a proxy that sets them.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Value stored when no source yields an address.
pub const UNKNOWN_CLIENT_IP: &str = "unknown";

/// Longest value the store accepts (an IPv6 literal with zone).
pub const MAX_CLIENT_IP_LEN: usize = 45;

/// Best-effort client address of the current request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// First non-empty of: first `X-Forwarded-For` entry, `X-Real-IP`, the peer address.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let forwarded = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let ip = forwarded
        .or_else(|| header("x-real-ip"))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT_IP.to_string());

    ip.chars().take(MAX_CLIENT_IP_LEN).collect()
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(resolve_client_ip(&parts.headers, peer)))
    }
}
