use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LogoutResponse, RegisterRequest, UserDto},
        errors::AuthError,
        extractors::{AuthUser, COOKIE_NAME},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserDto>, AuthError> {
    let user = state.auth.register(payload).await?;
    Ok(Json(user))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserDto>), AuthError> {
    let user = state.auth.authenticate(payload).await?;
    let token = state.auth.issue_session(user.id)?;

    let cookie = Cookie::build((COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .path("/")
        .max_age(state.auth.keys().ttl());

    Ok((jar.add(cookie), Json(user)))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserDto>, AuthError> {
    let user = state.auth.current_user(auth.user_id).await?;
    Ok(Json(user))
}

/// Clears the cookie only; an already issued token stays valid until it expires.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    info!("user logged out");
    let jar = jar.remove(Cookie::build(COOKIE_NAME).path("/"));
    (jar, Json(LogoutResponse { ok: true }))
}
