//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, SESSION_COOKIE};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Library catalog and lending form endpoints",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::profile,
        // Books
        books::list_books,
        books::get_book,
        books::edit_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::lend_view,
        loans::lend_book,
        loans::list_loans,
        loans::return_book,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::User,
            crate::models::user::RegisterForm,
            crate::models::user::LoginForm,
            // Books
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::BookEditView,
            crate::models::book::BookForm,
            crate::models::author::Author,
            // Loans
            crate::models::loan::LentBook,
            crate::models::loan::LoanDetails,
            crate::models::loan::LendForm,
            crate::models::loan::ReturnForm,
            crate::models::loan::ReturnReceipt,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SessionCookie),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and sessions"),
        (name = "books", description = "Catalog management"),
        (name = "loans", description = "Lending and returns")
    )
)]
pub struct ApiDoc;

struct SessionCookie;

impl Modify for SessionCookie {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
