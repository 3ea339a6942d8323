//! Repository tests against a live PostgreSQL database

use sqlx::postgres::PgPoolOptions;

use bookshelf_server::{
    models::{AuthorName, Book, BookForm},
    repository::Repository,
    AppConfig, AppError,
};

async fn repository() -> Repository {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| AppConfig::default().database.url);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Repository::new(pool)
}

fn tag() -> String {
    (chrono::Utc::now().timestamp_micros() % 1_000_000_000).to_string()
}

fn form(title: &str, quantity: i32) -> BookForm {
    BookForm {
        title: title.to_string(),
        isbn: "9780441013593".to_string(),
        year: 1965,
        price: 10,
        quantity,
        authors_input: String::new(),
    }
}

async fn create_book(repo: &Repository, title: &str, quantity: i32, authors: &[AuthorName]) -> Book {
    repo.books
        .create(&form(title, quantity), authors)
        .await
        .expect("Failed to create book")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_delete_removes_only_orphaned_authors() {
    let repo = repository().await;
    let tag = tag();
    let shared = AuthorName::parse(&format!("Shared {}", tag));
    let solo = AuthorName::parse(&format!("Solo {}", tag));

    let doomed = create_book(
        &repo,
        &format!("Doomed {}", tag),
        1,
        &[shared.clone(), solo.clone()],
    )
    .await;
    let kept = create_book(&repo, &format!("Kept {}", tag), 1, &[shared.clone()]).await;

    let authors = repo.books.get_authors(doomed.id).await.unwrap();
    let solo_id = authors
        .iter()
        .find(|a| a.first_name == "Solo")
        .map(|a| a.id)
        .expect("Solo author linked");
    let shared_id = authors
        .iter()
        .find(|a| a.first_name == "Shared")
        .map(|a| a.id)
        .expect("Shared author linked");

    let deleted = repo.books.delete(doomed.id).await.unwrap();
    assert_eq!(deleted.authors_removed, vec![solo_id]);

    let remaining = repo.books.get_authors(kept.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, shared_id);

    // Last book of the shared author takes it along
    let deleted = repo.books.delete(kept.id).await.unwrap();
    assert_eq!(deleted.authors_removed, vec![shared_id]);
}

#[tokio::test]
#[ignore]
async fn test_delete_counts_removed_loans() {
    let repo = repository().await;
    let tag = tag();
    let book = create_book(&repo, &format!("Loaned {}", tag), 5, &[]).await;
    let borrower = format!("Eve {}", tag);

    repo.loans.lend(book.id, &borrower, 1).await.unwrap();
    repo.loans.lend(book.id, &borrower, 2).await.unwrap();

    let deleted = repo.books.delete(book.id).await.unwrap();
    assert_eq!(deleted.loans_removed, 2);
    assert!(!repo
        .loans
        .list()
        .await
        .unwrap()
        .iter()
        .any(|l| l.borrower_name == borrower));
}

#[tokio::test]
#[ignore]
async fn test_repeat_lend_opens_new_row_and_return_settles_oldest() {
    let repo = repository().await;
    let tag = tag();
    let title = format!("Dune {}", tag);
    let borrower = format!("Alice {}", tag);
    let book = create_book(&repo, &title, 5, &[]).await;

    let first = repo.loans.lend(book.id, &borrower, 1).await.unwrap();
    let second = repo.loans.lend(book.id, &borrower, 2).await.unwrap();
    assert_ne!(first.id, second.id);

    let held: Vec<_> = repo
        .loans
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|l| l.borrower_name == borrower)
        .collect();
    assert_eq!(held.len(), 2);
    assert_eq!(repo.books.get_by_id(book.id).await.unwrap().quantity, 2);

    let receipt = repo.loans.return_copies(&borrower, &title, 1).await.unwrap();
    assert_eq!(receipt.loan_id, first.id);
    assert_eq!(receipt.still_lent, 0);
    assert_eq!(receipt.book_quantity, 3);

    let held: Vec<_> = repo
        .loans
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|l| l.borrower_name == borrower)
        .collect();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].id, second.id);
    assert_eq!(held[0].quantity, 2);

    repo.books.delete(book.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_concurrent_delete_and_return_do_not_deadlock() {
    let repo = repository().await;

    for round in 0..20 {
        let tag = format!("{}-{}", tag(), round);
        let title = format!("Race {}", tag);
        let borrower = format!("Racer {}", tag);
        let book = create_book(&repo, &title, 3, &[]).await;
        repo.loans.lend(book.id, &borrower, 2).await.unwrap();

        let (returned, deleted) = tokio::join!(
            repo.loans.return_copies(&borrower, &title, 1),
            repo.books.delete(book.id),
        );

        assert!(deleted.is_ok(), "delete failed: {:?}", deleted.err());
        match returned {
            Ok(_) | Err(AppError::NotFound(_)) => {}
            Err(e) => panic!("return failed: {:?}", e),
        }
    }
}
