//! Who submitted a comparison.
//!
//! The compare routes key the blacklist on a submitter identifier: the
//! `submitter_id` body field when given, else the peer IP. With
//! `trust_forwarded_for` set, the first `X-Forwarded-For` address replaces
//! the peer IP; otherwise the header is ignored, since any client can set it.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::state::ServerState;

/// Network identity of the caller, resolved from headers and the socket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientIdentity(pub Option<String>);

impl ClientIdentity {
    /// Resolve the caller from request parts. The forwarded header is only
    /// read when `trust_forwarded_for` is set.
    pub fn from_parts(parts: &Parts, trust_forwarded_for: bool) -> Self {
        let forwarded = if trust_forwarded_for {
            parts
                .headers
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(first_forwarded)
        } else {
            None
        };

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self(forwarded.or(peer))
    }
}

impl FromRequestParts<Arc<ServerState>> for ClientIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, state.config.trust_forwarded_for))
    }
}

fn first_forwarded(header: &str) -> Option<String> {
    header
        .split(',')
        .map(str::trim)
        .find(|addr| !addr.is_empty())
        .map(str::to_string)
}

/// Body field first, then the network identity. Blank ids count as absent.
pub fn resolve_submitter(body_id: Option<&str>, client: ClientIdentity) -> Option<String> {
    body_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or(client.0)
}
