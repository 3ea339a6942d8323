//! Loans repository: the lending ledger and the stock transfers against it

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{settle_return, stock_after_lend, LentBook, LoanDetails, ReturnOutcome, ReturnReceipt},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All outstanding loans, newest first
    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT lb.id, lb.borrower_name, lb.book_id, b.title AS book_title,
                   lb.quantity, lb.borrow_date
            FROM lent_books lb
            JOIN books b ON b.id = lb.book_id
            ORDER BY lb.borrow_date DESC, lb.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Move `quantity` copies of a book from the shelf to a new loan row.
    ///
    /// The book row is locked for the whole transaction, so two concurrent
    /// lends of the same book cannot both pass the stock check.
    pub async fn lend(&self, book_id: i32, borrower_name: &str, quantity: i32) -> AppResult<LentBook> {
        let mut tx = self.pool.begin().await?;

        let available: i32 =
            sqlx::query_scalar("SELECT quantity FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        // An early return drops `tx`, which rolls it back
        let remaining = stock_after_lend(available, quantity)?;

        sqlx::query("UPDATE books SET quantity = $1 WHERE id = $2")
            .bind(remaining)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let loan = sqlx::query_as::<_, LentBook>(
            r#"
            INSERT INTO lent_books (borrower_name, book_id, quantity, borrow_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, borrower_name, book_id, quantity, borrow_date
            "#,
        )
        .bind(borrower_name)
        .bind(book_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Move `quantity` copies from the loan of `book_title` held by
    /// `borrower_name` back to the shelf.
    ///
    /// When the borrower holds several loans of the same title, the oldest one
    /// is settled first.
    pub async fn return_copies(
        &self,
        borrower_name: &str,
        book_title: &str,
        quantity: i32,
    ) -> AppResult<ReturnReceipt> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, LentBook>(
            r#"
            SELECT lb.id, lb.borrower_name, lb.book_id, lb.quantity, lb.borrow_date
            FROM lent_books lb
            JOIN books b ON b.id = lb.book_id
            WHERE lb.borrower_name = $1 AND b.title = $2
            ORDER BY lb.borrow_date, lb.id
            LIMIT 1
            FOR UPDATE OF lb
            "#,
        )
        .bind(borrower_name)
        .bind(book_title)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No loan of '{}' found for '{}'",
                book_title, borrower_name
            ))
        })?;

        let outcome = settle_return(loan.quantity, quantity)?;

        match outcome {
            ReturnOutcome::Closed => {
                sqlx::query("DELETE FROM lent_books WHERE id = $1")
                    .bind(loan.id)
                    .execute(&mut *tx)
                    .await?;
            }
            ReturnOutcome::Remaining(left) => {
                sqlx::query("UPDATE lent_books SET quantity = $1 WHERE id = $2")
                    .bind(left)
                    .bind(loan.id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let book_quantity: i32 = sqlx::query_scalar(
            "UPDATE books SET quantity = quantity + $1 WHERE id = $2 RETURNING quantity",
        )
        .bind(quantity)
        .bind(loan.book_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReturnReceipt {
            loan_id: loan.id,
            book_id: loan.book_id,
            still_lent: outcome.still_lent(),
            book_quantity,
        })
    }
}
