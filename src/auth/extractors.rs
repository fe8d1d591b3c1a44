use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{
    auth::{dto::PublicUser, jwt::JwtKeys, repo::User},
    error::ApiError,
    state::AppState,
};

/// Resolved identity of the calling user. Extracting it runs the full auth
/// gate: pull a bearer credential from the headers, verify it, and load the
/// user it names, rejecting with 401 before the handler runs otherwise.
pub struct AuthUser(pub PublicUser);

/// Pull the bearer credential out of the request headers.
///
/// The `Authorization` header is authoritative when present: a value that is
/// not `Bearer <token>` is rejected outright rather than falling through to
/// `x-auth-token`, so the two conventions can never disagree about which
/// token authenticated a request. `x-auth-token` carries the raw token and
/// is only consulted when `Authorization` is absent.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Result<&str, ApiError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| ApiError::Unauthenticated("Not authorized, token failed".into()))?;
        return value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthenticated("Not authorized, token failed".into()));
    }
    if let Some(value) = headers.get("x-auth-token") {
        return value
            .to_str()
            .map_err(|_| ApiError::Unauthenticated("Not authorized, token failed".into()));
    }
    Err(ApiError::Unauthenticated("Not authorized, no token".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthenticated("Not authorized, token failed".into())
        })?;

        // One lookup per request; the password hash is never selected here.
        // A token can outlive its user, so a miss is an auth failure.
        let user = User::find_public_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for unknown user");
                ApiError::Unauthenticated("Not authorized, user not found".into())
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).expect("header name"),
                HeaderValue::from_str(value).expect("header value"),
            );
        }
        map
    }

    #[test]
    fn bearer_header_yields_token() {
        let map = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(token_from_headers(&map).expect("token"), "abc.def.ghi");
    }

    #[test]
    fn bearer_header_wins_when_both_present() {
        let map = headers(&[
            ("authorization", "Bearer from-authorization"),
            ("x-auth-token", "from-x-auth-token"),
        ]);
        assert_eq!(
            token_from_headers(&map).expect("token"),
            "from-authorization"
        );
    }

    #[test]
    fn malformed_authorization_does_not_fall_through() {
        let map = headers(&[
            ("authorization", "Token abc"),
            ("x-auth-token", "valid-looking-token"),
        ]);
        let err = token_from_headers(&map).expect_err("must reject");
        assert!(matches!(err, ApiError::Unauthenticated(_)));
        assert_eq!(err.to_string(), "Not authorized, token failed");
    }

    #[test]
    fn x_auth_token_used_when_authorization_absent() {
        let map = headers(&[("x-auth-token", "raw-token")]);
        assert_eq!(token_from_headers(&map).expect("token"), "raw-token");
    }

    #[test]
    fn missing_headers_is_no_token() {
        let err = token_from_headers(&HeaderMap::new()).expect_err("must reject");
        assert!(matches!(err, ApiError::Unauthenticated(_)));
        assert_eq!(err.to_string(), "Not authorized, no token");
    }
}
