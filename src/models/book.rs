//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::{format_authors_input, Author};

/// Book row from database. `quantity` counts the copies on the shelf.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub year: i32,
    pub price: i32,
    pub quantity: i32,
}

/// Book with its author display names, as shown in listings and detail pages
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub year: i32,
    pub price: i32,
    pub quantity: i32,
    pub authors: Vec<String>,
}

impl BookDetails {
    pub fn new(book: Book, authors: &[Author]) -> Self {
        Self {
            id: book.id,
            title: book.title,
            isbn: book.isbn,
            year: book.year,
            price: book.price,
            quantity: book.quantity,
            authors: authors.iter().map(Author::display_name).collect(),
        }
    }
}

/// Current values of a book, shaped like [`BookForm`] so an edit form can be pre-filled
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookEditView {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub year: i32,
    pub price: i32,
    pub quantity: i32,
    pub authors_input: String,
}

impl BookEditView {
    pub fn new(book: Book, authors: &[Author]) -> Self {
        Self {
            id: book.id,
            title: book.title,
            isbn: book.isbn,
            year: book.year,
            price: book.price,
            quantity: book.quantity,
            authors_input: format_authors_input(authors),
        }
    }
}

/// Create / update book form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 50, message = "Title must be 1-50 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 50, message = "ISBN must be 1-50 characters"))]
    pub isbn: String,
    pub year: i32,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i32,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    /// Comma-separated author names, e.g. `"Frank Herbert, Brian Herbert"`
    #[serde(default)]
    pub authors_input: String,
}
