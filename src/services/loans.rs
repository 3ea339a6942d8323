//! Lending service: lend and return workflows

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookDetails,
        loan::{LendForm, LentBook, LoanDetails, ReturnForm, ReturnReceipt},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All outstanding loans
    pub async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list().await
    }

    /// Book shown on the lend form
    pub async fn lend_view(&self, book_id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(book_id).await?;
        let authors = self.repository.books.get_authors(book_id).await?;
        Ok(BookDetails::new(book, &authors))
    }

    /// Lend copies of a book. Every call opens a new loan row, even for a
    /// borrower who already holds copies of the same book.
    pub async fn lend(&self, book_id: i32, form: LendForm) -> AppResult<LentBook> {
        form.validate()?;

        match self
            .repository
            .loans
            .lend(book_id, &form.borrower_name, form.quantity)
            .await
        {
            Ok(loan) => {
                tracing::info!(
                    loan_id = loan.id,
                    book_id,
                    borrower = %loan.borrower_name,
                    quantity = loan.quantity,
                    "Book lent"
                );
                Ok(loan)
            }
            Err(e @ AppError::InsufficientStock { available, requested }) => {
                tracing::warn!(book_id, available, requested, "Lend rejected: insufficient stock");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Return copies borrowed under `borrower_name` for `book_title`
    pub async fn return_copies(&self, form: ReturnForm) -> AppResult<ReturnReceipt> {
        form.validate()?;

        match self
            .repository
            .loans
            .return_copies(&form.borrower_name, &form.book_title, form.quantity)
            .await
        {
            Ok(receipt) => {
                tracing::info!(
                    loan_id = receipt.loan_id,
                    book_id = receipt.book_id,
                    returned = form.quantity,
                    still_lent = receipt.still_lent,
                    "Book returned"
                );
                Ok(receipt)
            }
            Err(e @ AppError::ExcessReturn { borrowed, returned }) => {
                tracing::warn!(
                    borrower = %form.borrower_name,
                    title = %form.book_title,
                    borrowed,
                    returned,
                    "Return rejected: more copies than borrowed"
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
