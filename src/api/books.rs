//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookEditView, BookForm},
    AppState,
};

use super::{AuthenticatedUser, FormData};

/// List all books (home page)
#[utoipa::path(
    get,
    path = "/",
    tag = "books",
    security(("session" = [])),
    responses(
        (status = 200, description = "All books with their authors", body = Vec<BookDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("session" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Current book values for the edit form, authors joined into `authors_input`
#[utoipa::path(
    get,
    path = "/books/{id}/edit",
    tag = "books",
    security(("session" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Pre-filled edit form", body = BookEditView),
        (status = 404, description = "Book not found")
    )
)]
pub async fn edit_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookEditView>> {
    let view = state.services.catalog.edit_view(id).await?;
    Ok(Json(view))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("session" = [])),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Book created, redirect to the book list"),
        (status = 400, description = "Invalid data")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    FormData(form): FormData<BookForm>,
) -> AppResult<Redirect> {
    state.services.catalog.create_book(form).await?;
    Ok(Redirect::to("/"))
}

/// Update an existing book
#[utoipa::path(
    post,
    path = "/books/{id}",
    tag = "books",
    security(("session" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Book updated, redirect to the book list"),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    FormData(form): FormData<BookForm>,
) -> AppResult<Redirect> {
    state.services.catalog.update_book(id, form).await?;
    Ok(Redirect::to("/"))
}

/// Delete a book, its loans, and authors left without books
#[utoipa::path(
    post,
    path = "/books/{id}/delete",
    tag = "books",
    security(("session" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Book deleted, redirect to the book list"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    state.services.catalog.delete_book(id).await?;
    Ok(Redirect::to("/"))
}
