//! Data models for Bookshelf

pub mod author;
pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorName};
pub use book::{Book, BookDetails, BookEditView, BookForm};
pub use loan::{LendForm, LentBook, LoanDetails, ReturnForm, ReturnReceipt};
pub use user::{LoginForm, RegisterForm, User, UserClaims};
