use axum::extract::{Query, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::TypedHeader;
use headers::authorization::Bearer;
use headers::Authorization;
use serde::Deserialize;

use crate::models::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

/// Layered onto the location routes. The token may arrive as a
/// `Bearer` authorization header or a `token` query parameter; the header
/// takes precedence when both are present. The response for a bad token is
/// the same whether or not a position is currently stored.
pub async fn require_token<B>(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    query: Option<Query<TokenQuery>>,
    req: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let provided = bearer
        .map(|TypedHeader(header)| header.token().to_string())
        .or_else(|| query.and_then(|Query(q)| q.token));

    match provided {
        Some(token) if token_matches(&token, &state.config.location_token) => {
            Ok(next.run(req).await)
        }
        _ => Err(ApiError::Unauthorized),
    }
}

/// Constant-time equality so the comparison does not leak how much of the
/// secret matched.
fn token_matches(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
