//! PostgreSQL book storage

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook, DUPLICATE_ID_MESSAGE},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY book_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_one(&self, book_id: i32) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (book_id, title, author, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.book_id)
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::DuplicateId(DUPLICATE_ID_MESSAGE.to_string())
            }
            other => AppError::Database(other),
        })
    }

    async fn update(&self, book_id: i32, data: &UpdateBook) -> AppResult<u64> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.author, "author");
        add_field!(data.description, "description");

        let query = format!(
            "UPDATE books SET {} WHERE book_id = ${}",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.author);
        bind_field!(data.description);

        let result = builder.bind(book_id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn destroy(&self, book_id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// These need a Postgres server: `DATABASE_URL=... cargo test -- --ignored`
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

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn create_on_existing_key_is_duplicate_id(pool: Pool<Postgres>) {
        let repository = BooksRepository::new(pool);
        repository.create(&hobbit()).await.unwrap();

        let mut clash = hobbit();
        clash.title = "Fantastic Mr. Fox".to_string();
        let err = repository.create(&clash).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateId(ref msg) if msg == "Book ID already exists"));
        let stored = repository.find_one(1).await.unwrap().unwrap();
        assert_eq!(stored.title, "The Hobbit");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn partial_update_only_touches_given_fields(pool: Pool<Postgres>) {
        let repository = BooksRepository::new(pool);
        let created = repository.create(&hobbit()).await.unwrap();

        let patch = UpdateBook {
            description: Some("Fantasy tale about biting off more than you can chew.".to_string()),
            ..Default::default()
        };
        assert_eq!(repository.update(1, &patch).await.unwrap(), 1);

        let updated = repository.find_one(1).await.unwrap().unwrap();
        assert_eq!(updated.title, "The Hobbit");
        assert_eq!(updated.author, "J. R. R. Tolkien");
        assert_eq!(
            updated.description,
            "Fantasy tale about biting off more than you can chew."
        );
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn update_with_every_field_binds_in_order(pool: Pool<Postgres>) {
        let repository = BooksRepository::new(pool);
        repository.create(&hobbit()).await.unwrap();

        let patch = UpdateBook {
            title: Some("The Hobbit, or There and Back Again".to_string()),
            author: Some("Tolkien".to_string()),
            description: Some("A hobbit goes on an adventure.".to_string()),
        };
        assert_eq!(repository.update(1, &patch).await.unwrap(), 1);

        let updated = repository.find_one(1).await.unwrap().unwrap();
        assert_eq!(updated.title, "The Hobbit, or There and Back Again");
        assert_eq!(updated.author, "Tolkien");
        assert_eq!(updated.description, "A hobbit goes on an adventure.");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn update_and_destroy_on_missing_id_affect_nothing(pool: Pool<Postgres>) {
        let repository = BooksRepository::new(pool);
        repository.create(&hobbit()).await.unwrap();

        let patch = UpdateBook {
            title: Some("Nobody".to_string()),
            ..Default::default()
        };
        assert_eq!(repository.update(99, &patch).await.unwrap(), 0);
        assert_eq!(repository.destroy(99).await.unwrap(), 0);
        assert_eq!(repository.find_all().await.unwrap().len(), 1);

        assert_eq!(repository.destroy(1).await.unwrap(), 1);
        assert!(repository.find_all().await.unwrap().is_empty());
    }
}
