//! Lending endpoints

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::BookDetails,
        loan::{LendForm, LoanDetails, ReturnForm},
    },
    AppState,
};

use super::{AuthenticatedUser, FormData};

/// Book summary for the lend form
#[utoipa::path(
    get,
    path = "/books/{id}/lend",
    tag = "loans",
    security(("session" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book to lend", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn lend_view(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.loans.lend_view(book_id).await?;
    Ok(Json(book))
}

/// Lend copies of a book to a borrower
#[utoipa::path(
    post,
    path = "/books/{id}/lend",
    tag = "loans",
    security(("session" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body(content = LendForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Copies lent, redirect to the loan list"),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Not enough books in stock")
    )
)]
pub async fn lend_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    FormData(form): FormData<LendForm>,
) -> AppResult<Redirect> {
    state.services.loans.lend(book_id, form).await?;
    Ok(Redirect::to("/loans"))
}

/// List outstanding loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("session" = [])),
    responses(
        (status = 200, description = "Outstanding loans", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_loans().await?;
    Ok(Json(loans))
}

/// Return copies by borrower name and book title
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    security(("session" = [])),
    request_body(content = ReturnForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Copies returned, redirect to the loan list"),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "No matching loan"),
        (status = 422, description = "More copies returned than borrowed")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    FormData(form): FormData<ReturnForm>,
) -> AppResult<Redirect> {
    state.services.loans.return_copies(form).await?;
    Ok(Redirect::to("/loans"))
}
