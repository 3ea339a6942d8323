//! Loan (lent book) model and the stock transfer rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Outstanding loan row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LentBook {
    pub id: i32,
    pub borrower_name: String,
    pub book_id: i32,
    pub quantity: i32,
    pub borrow_date: DateTime<Utc>,
}

/// Loan joined with its book for the loans listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub borrower_name: String,
    pub book_id: i32,
    pub book_title: String,
    pub quantity: i32,
    pub borrow_date: DateTime<Utc>,
}

/// Lend form, posted against a specific book
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LendForm {
    #[validate(length(min = 1, max = 255, message = "Borrower name must be 1-255 characters"))]
    pub borrower_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Return form: the loan is looked up by borrower and book title
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnForm {
    #[validate(length(min = 1, max = 255, message = "Borrower name must be 1-255 characters"))]
    pub borrower_name: String,
    #[validate(length(min = 1, max = 50, message = "Book title must be 1-50 characters"))]
    pub book_title: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Result of a committed return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnReceipt {
    pub loan_id: i32,
    pub book_id: i32,
    /// Copies still lent under this loan; 0 means the loan row was removed
    pub still_lent: i32,
    /// Shelf quantity of the book after the return
    pub book_quantity: i32,
}

// =========================================================================
// Transfer rules
// =========================================================================

/// Shelf quantity left after lending `requested` copies out of `available`.
pub fn stock_after_lend(available: i32, requested: i32) -> AppResult<i32> {
    if requested > available {
        return Err(AppError::InsufficientStock {
            available,
            requested,
        });
    }
    Ok(available - requested)
}

/// What happens to a loan row after part or all of it comes back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Loan stays open with this many copies
    Remaining(i32),
    /// Every copy is back; the loan row goes away
    Closed,
}

impl ReturnOutcome {
    pub fn still_lent(self) -> i32 {
        match self {
            ReturnOutcome::Remaining(n) => n,
            ReturnOutcome::Closed => 0,
        }
    }
}

/// Settle a return of `returned` copies against a loan of `borrowed` copies.
pub fn settle_return(borrowed: i32, returned: i32) -> AppResult<ReturnOutcome> {
    if returned > borrowed {
        return Err(AppError::ExcessReturn { borrowed, returned });
    }
    match borrowed - returned {
        0 => Ok(ReturnOutcome::Closed),
        left => Ok(ReturnOutcome::Remaining(left)),
    }
}
