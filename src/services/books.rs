//! Books service
//!
//! Existence checks sit here; the store only reports rows and counts.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook, DUPLICATE_ID_MESSAGE},
    repository::BookStore,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.store.find_all().await
    }

    /// Get a book by its ID
    pub async fn get_book(&self, book_id: i32) -> AppResult<Book> {
        self.store
            .find_one(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book found with ID: {}", book_id)))
    }

    /// Create a book, rejecting an ID that is already taken.
    ///
    /// The lookup and the insert are not atomic; a concurrent insert of the
    /// same ID is caught by the store's key constraint instead.
    pub async fn save_book(&self, data: &CreateBook) -> AppResult<Book> {
        if self.store.find_one(data.book_id).await?.is_some() {
            tracing::warn!(book_id = data.book_id, "Rejected book with existing ID");
            return Err(AppError::DuplicateId(DUPLICATE_ID_MESSAGE.to_string()));
        }

        let book = self.store.create(data).await?;
        tracing::info!(book_id = book.book_id, "Book created");
        Ok(book)
    }

    /// Apply a partial update, returning the number of affected books
    pub async fn update_book(&self, book_id: i32, data: &UpdateBook) -> AppResult<u64> {
        let affected = self.store.update(book_id, data).await?;
        if affected == 0 {
            tracing::warn!(book_id, "Update of unknown book");
            return Err(AppError::NotFound(format!(
                "Unable to update book ID:{} as it does not exist.",
                book_id
            )));
        }

        tracing::info!(book_id, affected, "Book updated");
        Ok(affected)
    }

    /// Delete a book, returning the number of removed books
    pub async fn delete_book(&self, book_id: i32) -> AppResult<u64> {
        let removed = self.store.destroy(book_id).await?;
        if removed == 0 {
            tracing::warn!(book_id, "Delete of unknown book");
            return Err(AppError::NotFound(format!(
                "Unable to delete book ID:{} as it does not exist.",
                book_id
            )));
        }

        tracing::info!(book_id, removed, "Book deleted");
        Ok(removed)
    }

    /// Check that storage answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
