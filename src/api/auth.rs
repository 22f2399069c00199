// =============================================================================
// Bearer Token Authentication: Axum extractor
// =============================================================================
//
// Validates `Authorization: Bearer <token>` against the admin token loaded
// from `ETFLAB_ADMIN_TOKEN` at startup. Comparison is constant time.
//
//   async fn handler(_auth: AuthBearer, ...) { ... }
//
// A missing, malformed or wrong token short-circuits with 403 and a JSON
// error body; so does a server started without a token.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::app_state::AppState;

pub const ADMIN_TOKEN_ENV: &str = "ETFLAB_ADMIN_TOKEN";

/// Compare two byte slices in constant time for equal lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Expected admin token, pulled out of the router state.
#[derive(Clone)]
pub struct AdminToken(pub Option<String>);

impl<S> FromRef<Arc<AppState<S>>> for AdminToken {
    fn from_ref(state: &Arc<AppState<S>>) -> Self {
        AdminToken(state.admin_token.clone())
    }
}

/// Proof that the request carried the admin token.
pub struct AuthBearer;

pub struct AuthRejection {
    message: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthBearer
where
    S: Send + Sync,
    AdminToken: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AdminToken(expected) = AdminToken::from_ref(state);
        let Some(expected) = expected else {
            warn!("{ADMIN_TOKEN_ENV} is not set, rejecting authenticated request");
            return Err(AuthRejection {
                message: "Server authentication not configured",
            });
        };

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let Some(token) = token else {
            warn!("Missing or malformed Authorization header");
            return Err(AuthRejection {
                message: "Missing or invalid authorization token",
            });
        };

        if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
            warn!("Invalid admin token presented");
            return Err(AuthRejection {
                message: "Invalid authorization token",
            });
        }

        Ok(AuthBearer)
    }
}
