//! HTTP handlers for the Bookshelf form endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Name of the cookie holding the session JWT
pub const SESSION_COOKIE: &str = "session";

/// Extractor for the authenticated user, from the session cookie or a Bearer token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = match bearer {
            Some(token) => token,
            None => {
                let jar = CookieJar::from_headers(&parts.headers);
                jar.get(SESSION_COOKIE)
                    .map(|cookie| cookie.value().to_string())
                    .ok_or_else(|| AppError::Authentication("Login required".to_string()))?
            }
        };

        let claims = UserClaims::from_token(&token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// `application/x-www-form-urlencoded` body whose decoding failures become
/// [`AppError::Validation`]
pub struct FormData<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormData<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(format!("Invalid data! {}", rejection.body_text())))?;
        Ok(FormData(value))
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/", get(books::list_books))
        .route("/books", post(books::create_book))
        .route("/books/:id", get(books::get_book).post(books::update_book))
        .route("/books/:id/edit", get(books::edit_book))
        .route("/books/:id/delete", post(books::delete_book))
        // Lending
        .route("/books/:id/lend", get(loans::lend_view).post(loans::lend_book))
        .route("/loans", get(loans::list_loans))
        .route("/loans/return", post(loans::return_book))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile))
        .with_state(state);

    Router::new()
        .merge(app)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
