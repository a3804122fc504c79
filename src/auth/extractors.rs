use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use super::{errors::AuthError, jwt::JwtKeys};

pub const COOKIE_NAME: &str = "access_token";

/// Validated session claim of the caller. Reads the `access_token` cookie,
/// falling back to `Authorization: Bearer` for non-browser clients.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(|| {
            warn!("missing session token");
            AuthError::InvalidToken
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.decode(&token).map_err(|e| {
            warn!("invalid or expired token");
            e
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(c) = jar.get(COOKIE_NAME) {
        if !c.value().is_empty() {
            return Some(c.value().to_owned());
        }
    }

    let auth = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(req: Request<()>) -> Parts {
        req.into_parts().0
    }

    #[test]
    fn cookie_wins_over_header() {
        let p = parts(
            Request::builder()
                .header(header::COOKIE, "theme=dark; access_token=from-cookie")
                .header(header::AUTHORIZATION, "Bearer from-header")
                .body(())
                .unwrap(),
        );
        assert_eq!(token_from_parts(&p).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let p = parts(
            Request::builder()
                .header(header::AUTHORIZATION, "Bearer abc.def.ghi")
                .body(())
                .unwrap(),
        );
        assert_eq!(token_from_parts(&p).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn nothing_usable_yields_none() {
        let p = parts(Request::builder().body(()).unwrap());
        assert!(token_from_parts(&p).is_none());

        let p = parts(
            Request::builder()
                .header(header::COOKIE, "access_token=")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(())
                .unwrap(),
        );
        assert!(token_from_parts(&p).is_none());
    }
}
