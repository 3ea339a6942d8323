//! Live integration tests.
//!
//! `api_tests` talks to a running server; `repository_tests` connects to
//! `DATABASE_URL` directly. Run with `cargo test --test integration -- --ignored`.

mod api_tests;
mod repository_tests;
