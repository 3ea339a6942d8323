//! Registration, login, logout and profile endpoints

use axum::{extract::State, response::Redirect, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    error::AppResult,
    models::user::{LoginForm, RegisterForm, User},
    AppState,
};

use super::{AuthenticatedUser, FormData, SESSION_COOKIE};

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Register a new account and log it in
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered and logged in, redirect to the book list"),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    FormData(form): FormData<RegisterForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let (token, _user) = state.services.users.register(form).await?;
    let jar = jar.add(session_cookie(token, state.config.auth.secure_cookie));
    Ok((jar, Redirect::to("/")))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to the book list"),
        (status = 400, description = "Invalid data"),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    FormData(form): FormData<LoginForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let (token, user) = state.services.users.authenticate(form).await?;
    tracing::info!(user_id = user.id, "User logged in");
    let jar = jar.add(session_cookie(token, state.config.auth.secure_cookie));
    Ok((jar, Redirect::to("/")))
}

/// Log out by clearing the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("session" = [])),
    responses(
        (status = 303, description = "Logged out, redirect to the login page")
    )
)]
pub async fn logout(
    AuthenticatedUser(claims): AuthenticatedUser,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    tracing::info!(user_id = claims.user_id, "User logged out");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/auth/login"))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    security(("session" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}
