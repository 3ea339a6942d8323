//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{parse_authors_input, AuthorName, NAME_MAX_LEN},
        book::{Book, BookDetails, BookEditView, BookForm},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books with their authors
    pub async fn list_books(&self) -> AppResult<Vec<BookDetails>> {
        self.repository.books.list().await
    }

    /// Get book by ID with its authors
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let authors = self.repository.books.get_authors(id).await?;
        Ok(BookDetails::new(book, &authors))
    }

    /// Current values of a book for the edit form
    pub async fn edit_view(&self, id: i32) -> AppResult<BookEditView> {
        let book = self.repository.books.get_by_id(id).await?;
        let authors = self.repository.books.get_authors(id).await?;
        Ok(BookEditView::new(book, &authors))
    }

    /// Create a new book; authors are resolved by exact name or created
    pub async fn create_book(&self, form: BookForm) -> AppResult<Book> {
        form.validate()?;
        let authors = parse_authors(&form.authors_input)?;

        let book = self.repository.books.create(&form, &authors).await?;
        tracing::info!(book_id = book.id, title = %book.title, authors = authors.len(), "Book created");
        Ok(book)
    }

    /// Update a book. A blank author list leaves the current authors in place;
    /// otherwise the author set is replaced wholesale.
    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<Book> {
        form.validate()?;
        let authors = parse_authors(&form.authors_input)?;
        let replace = if authors.is_empty() {
            None
        } else {
            Some(authors.as_slice())
        };

        let book = self.repository.books.update(id, &form, replace).await?;
        tracing::info!(book_id = id, authors_replaced = replace.is_some(), "Book updated");
        Ok(book)
    }

    /// Delete a book with its loans; authors left without books go too
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let deleted = self.repository.books.delete(id).await?;
        tracing::info!(
            book_id = id,
            loans_removed = deleted.loans_removed,
            authors_removed = ?deleted.authors_removed,
            "Book deleted"
        );
        Ok(())
    }
}

fn parse_authors(input: &str) -> AppResult<Vec<AuthorName>> {
    let authors = parse_authors_input(input);
    if let Some(bad) = authors.iter().find(|a| !a.fits_columns()) {
        return Err(AppError::Validation(format!(
            "Author name '{} {}' is too long (max {} characters per part)",
            bad.first_name, bad.last_name, NAME_MAX_LEN
        )));
    }
    Ok(authors)
}
