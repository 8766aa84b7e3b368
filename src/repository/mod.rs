//! Repository layer for book storage
//!
//! The service depends on [`BookStore`] only, so the Postgres table and the
//! in-memory map are interchangeable.

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
};

pub use books::BooksRepository;
pub use memory::InMemoryBooksRepository;

/// Record-level primitives over the `books` table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ordered by `book_id`
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn find_one(&self, book_id: i32) -> AppResult<Option<Book>>;

    /// Insert a book. A key collision yields `AppError::DuplicateId`.
    async fn create(&self, data: &CreateBook) -> AppResult<Book>;

    /// Returns the number of rows updated
    async fn update(&self, book_id: i32, data: &UpdateBook) -> AppResult<u64>;

    /// Returns the number of rows deleted
    async fn destroy(&self, book_id: i32) -> AppResult<u64>;

    /// Check the backing storage is reachable
    async fn ping(&self) -> AppResult<()>;
}
