//! In-memory book storage
//!
//! Backs the server when `database.backend = "memory"` and the HTTP tests.
//! Keys are kept in a `BTreeMap` so listing order matches the Postgres
//! `ORDER BY book_id`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook, DUPLICATE_ID_MESSAGE},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryBooksRepository {
    books: Arc<RwLock<BTreeMap<i32, Book>>>,
}

impl InMemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `books`
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let map = books.into_iter().map(|book| (book.book_id, book)).collect();
        Self {
            books: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl BookStore for InMemoryBooksRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn find_one(&self, book_id: i32) -> AppResult<Option<Book>> {
        Ok(self.books.read().await.get(&book_id).cloned())
    }

    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut books = self.books.write().await;
        if books.contains_key(&data.book_id) {
            return Err(AppError::DuplicateId(DUPLICATE_ID_MESSAGE.to_string()));
        }

        let now = Utc::now();
        let book = Book {
            book_id: data.book_id,
            title: data.title.clone(),
            author: data.author.clone(),
            description: data.description.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        books.insert(book.book_id, book.clone());
        Ok(book)
    }

    async fn update(&self, book_id: i32, data: &UpdateBook) -> AppResult<u64> {
        let mut books = self.books.write().await;
        match books.get_mut(&book_id) {
            Some(book) => {
                data.apply_to(book);
                book.updated_at = Some(Utc::now());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn destroy(&self, book_id: i32) -> AppResult<u64> {
        let removed = self.books.write().await.remove(&book_id);
        Ok(u64::from(removed.is_some()))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hobbit() -> CreateBook {
        CreateBook {
            book_id: 1,
            title: "The Hobbit".to_string(),
            author: "J. R. R. Tolkien".to_string(),
            description: "Someone finds a nice piece of jewellery while on holiday.".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_find_one() {
        let store = InMemoryBooksRepository::new();
        let created = store.create(&hobbit()).await.unwrap();

        assert!(created.created_at.is_some());
        assert_eq!(created.title, "The Hobbit");
        assert_eq!(created.author, "J. R. R. Tolkien");
        assert_eq!(store.find_one(1).await.unwrap(), Some(created));
        assert_eq!(store.find_one(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_rejects_occupied_key() {
        let store = InMemoryBooksRepository::new();
        store.create(&hobbit()).await.unwrap();

        let mut clash = hobbit();
        clash.title = "Fantastic Mr. Fox".to_string();
        let err = store.create(&clash).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateId(ref msg) if msg == "Book ID already exists"));
        assert_eq!(store.find_one(1).await.unwrap().unwrap().title, "The Hobbit");
    }

    #[tokio::test]
    async fn find_all_is_ordered_by_book_id() {
        let store = InMemoryBooksRepository::new();
        for id in [3, 1, 2] {
            let mut data = hobbit();
            data.book_id = id;
            store.create(&data).await.unwrap();
        }

        let ids: Vec<i32> = store
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|b| b.book_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_and_destroy_report_affected_rows() {
        let store = InMemoryBooksRepository::new();
        store.create(&hobbit()).await.unwrap();

        let patch = UpdateBook {
            author: Some("Tolkien".to_string()),
            ..Default::default()
        };
        assert_eq!(store.update(1, &patch).await.unwrap(), 1);
        assert_eq!(store.update(5, &patch).await.unwrap(), 0);
        assert_eq!(store.find_one(1).await.unwrap().unwrap().author, "Tolkien");

        assert_eq!(store.destroy(1).await.unwrap(), 1);
        assert_eq!(store.destroy(1).await.unwrap(), 0);
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
