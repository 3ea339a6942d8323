//! Books repository: catalog rows and the book/author association

use std::collections::HashMap;

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorName},
        book::{Book, BookDetails, BookForm},
    },
};

/// What a book deletion took with it
#[derive(Debug, Clone, Default)]
pub struct DeletedBook {
    pub loans_removed: i64,
    pub authors_removed: Vec<i32>,
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, isbn, year, price, quantity FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Authors of a book, in name order
    pub async fn get_authors(&self, book_id: i32) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.id, a.first_name, a.last_name
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = $1
            ORDER BY a.last_name, a.first_name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    /// All books with their author names
    pub async fn list(&self) -> AppResult<Vec<BookDetails>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, isbn, year, price, quantity FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, (i32, i32, String, String)>(
            r#"
            SELECT ba.book_id, a.id, a.first_name, a.last_name
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            ORDER BY a.last_name, a.first_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_book: HashMap<i32, Vec<Author>> = HashMap::new();
        for (book_id, id, first_name, last_name) in rows {
            by_book.entry(book_id).or_default().push(Author {
                id,
                first_name,
                last_name,
            });
        }

        Ok(books
            .into_iter()
            .map(|book| {
                let authors = by_book.remove(&book.id).unwrap_or_default();
                BookDetails::new(book, &authors)
            })
            .collect())
    }

    // =========================================================================
    // CREATE / UPDATE
    // =========================================================================

    /// Create a book and link it to `authors`
    pub async fn create(&self, form: &BookForm, authors: &[AuthorName]) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, isbn, year, price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, isbn, year, price, quantity
            "#,
        )
        .bind(&form.title)
        .bind(&form.isbn)
        .bind(form.year)
        .bind(form.price)
        .bind(form.quantity)
        .fetch_one(&mut *tx)
        .await?;

        replace_authors(&mut tx, book.id, authors).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Update book fields. `authors` of `None` keeps the current association.
    pub async fn update(
        &self,
        id: i32,
        form: &BookForm,
        authors: Option<&[AuthorName]>,
    ) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = $1,
                isbn = $2,
                year = $3,
                price = $4,
                quantity = $5
            WHERE id = $6
            RETURNING id, title, isbn, year, price, quantity
            "#,
        )
        .bind(&form.title)
        .bind(&form.isbn)
        .bind(form.year)
        .bind(form.price)
        .bind(form.quantity)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(authors) = authors {
            replace_authors(&mut tx, id, authors).await?;
        }

        tx.commit().await?;
        Ok(book)
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book, its loans, and any author left without books
    pub async fn delete(&self, id: i32) -> AppResult<DeletedBook> {
        let mut tx = self.pool.begin().await?;

        let author_ids: Vec<i32> =
            sqlx::query_scalar("SELECT author_id FROM book_authors WHERE book_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        // Loans before the book, the same order a return takes its locks
        let loan_ids: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM lent_books WHERE book_id = $1 FOR UPDATE")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        // lent_books and book_authors cascade
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM books WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if deleted.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let authors_removed: Vec<i32> = sqlx::query_scalar(
            r#"
            DELETE FROM authors a
            WHERE a.id = ANY($1)
              AND NOT EXISTS (SELECT 1 FROM book_authors ba WHERE ba.author_id = a.id)
            RETURNING a.id
            "#,
        )
        .bind(&author_ids)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DeletedBook {
            loans_removed: loan_ids.len() as i64,
            authors_removed,
        })
    }
}

// =========================================================================
// AUTHORS (book_authors junction)
// =========================================================================

/// Replace all authors for a book: delete existing rows then insert new ones.
async fn replace_authors(
    conn: &mut PgConnection,
    book_id: i32,
    authors: &[AuthorName],
) -> AppResult<()> {
    sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    for author in authors {
        let author_id = ensure_author(conn, author).await?;

        sqlx::query(
            r#"
            INSERT INTO book_authors (book_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(author_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Insert author if new, or return the id of the one with the same exact name.
async fn ensure_author(conn: &mut PgConnection, author: &AuthorName) -> AppResult<i32> {
    // The no-op update makes RETURNING yield the existing row on conflict
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO authors (first_name, last_name)
        VALUES ($1, $2)
        ON CONFLICT (first_name, last_name) DO UPDATE SET first_name = EXCLUDED.first_name
        RETURNING id
        "#,
    )
    .bind(&author.first_name)
    .bind(&author.last_name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}
