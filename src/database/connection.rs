use std::borrow::Cow;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::instrument;

use super::quiz::Quiz;

/// Errors surfaced by the quiz store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// One message per violated field constraint.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct Connection {
    pool: SqlitePool,
}

const SEED: [(&str, &str); 4] = [
    ("Capital de Italia", "Roma"),
    ("Capital de Francia", "París"),
    ("Capital de España", "Madrid"),
    ("Capital de Portugal", "Lisboa"),
];

impl Connection {
    /// A single connection: the store has one interactive writer, and an
    /// in-memory database stays coherent under test.
    pub async fn connect(connection_string: Cow<'_, str>) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&connection_string)
            .await?;
        Ok(Self { pool })
    }

    /// Runs the embedded migrations, then seeds the default rows when the
    /// table is empty.
    #[instrument(level = "info", skip(self))]
    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;

        let count = self.count().await?;
        if count == 0 {
            for (question, answer) in SEED {
                self.create(question, answer).await?;
            }
            log::info!("DB created with {} elems", SEED.len());
        } else {
            log::info!("DB exists & has {count} elems");
        }
        Ok(())
    }
}

pub trait CountQuizzes {
    async fn count(&self) -> Result<i64, StoreError>;
}

pub trait RetrieveQuiz {
    async fn find_all(&self) -> Result<Vec<Quiz>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Quiz>, StoreError>;
}

pub trait CreateQuiz {
    async fn create(&self, question: &str, answer: &str) -> Result<Quiz, StoreError>;
}

pub trait SaveQuiz {
    async fn save(&self, quiz: &Quiz) -> Result<Quiz, StoreError>;
}

pub trait DeleteQuiz {
    async fn destroy(&self, id: i64) -> Result<u64, StoreError>;
}

fn validate_fields(question: &str, answer: &str) -> Result<(), StoreError> {
    let mut messages = Vec::new();
    if question.trim().is_empty() {
        messages.push("The question must not be empty".to_string());
    }
    if answer.trim().is_empty() {
        messages.push("The answer must not be empty".to_string());
    }
    if messages.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(messages))
    }
}

fn map_unique_violation(error: sqlx::Error) -> StoreError {
    match error.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            StoreError::Validation(vec!["The question already exists".to_string()])
        }
        _ => StoreError::Database(error),
    }
}

impl CountQuizzes for Connection {
    async fn count(&self) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quizzes")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

impl RetrieveQuiz for Connection {
    async fn find_all(&self) -> Result<Vec<Quiz>, StoreError> {
        let quizzes =
            sqlx::query_as::<_, Quiz>("SELECT id, question, answer FROM quizzes ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(quizzes)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Quiz>, StoreError> {
        let quiz =
            sqlx::query_as::<_, Quiz>("SELECT id, question, answer FROM quizzes WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(quiz)
    }
}

impl CreateQuiz for Connection {
    async fn create(&self, question: &str, answer: &str) -> Result<Quiz, StoreError> {
        validate_fields(question, answer)?;
        log::debug!("inserting quiz '{question}'");
        let quiz = sqlx::query_as::<_, Quiz>(
            "INSERT INTO quizzes (question, answer) VALUES (?, ?) RETURNING id, question, answer",
        )
        .bind(question)
        .bind(answer)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(quiz)
    }
}

impl SaveQuiz for Connection {
    async fn save(&self, quiz: &Quiz) -> Result<Quiz, StoreError> {
        validate_fields(quiz.question(), quiz.answer())?;
        log::debug!("updating quiz id={}", quiz.id());
        let updated = sqlx::query_as::<_, Quiz>(
            "UPDATE quizzes SET question = ?, answer = ? WHERE id = ? \
             RETURNING id, question, answer",
        )
        .bind(quiz.question())
        .bind(quiz.answer())
        .bind(quiz.id())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(updated)
    }
}

impl DeleteQuiz for Connection {
    async fn destroy(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Connection {
        let connection = Connection::connect(Cow::Borrowed("sqlite::memory:"))
            .await
            .expect("in-memory database should open");
        connection
            .initialize()
            .await
            .expect("migrations and seeding should succeed");
        connection
    }

    #[tokio::test]
    async fn initialize_seeds_four_rows_once() {
        let store = memory_store().await;
        assert_eq!(store.count().await.unwrap(), 4);

        // A second initialize must not re-seed.
        store.initialize().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 4);

        let all = store.find_all().await.unwrap();
        assert_eq!(all[0].question(), "Capital de Italia");
        assert_eq!(all[0].answer(), "Roma");
        assert_eq!(all[3].question(), "Capital de Portugal");
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = memory_store().await;
        let quiz = store.create("Capital de Alemania", "Berlín").await.unwrap();
        assert_eq!(quiz.id(), 5);
        assert_eq!(quiz.question(), "Capital de Alemania");

        let found = store.find_by_id(5).await.unwrap().unwrap();
        assert_eq!(found, quiz);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_question() {
        let store = memory_store().await;
        let err = store.create("Capital de Italia", "Milán").await.unwrap_err();
        match err {
            StoreError::Validation(messages) => {
                assert_eq!(messages, vec!["The question already exists".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_rejects_empty_fields_with_one_message_each() {
        let store = memory_store().await;
        let err = store.create("", "   ").await.unwrap_err();
        match err {
            StoreError::Validation(messages) => {
                assert_eq!(
                    messages,
                    vec![
                        "The question must not be empty".to_string(),
                        "The answer must not be empty".to_string(),
                    ]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_updates_in_place_and_keeps_id() {
        let store = memory_store().await;
        let mut quiz = store.find_by_id(2).await.unwrap().unwrap();
        quiz.set_question("Capital de Bélgica".to_string());
        quiz.set_answer("Bruselas".to_string());

        let updated = store.save(&quiz).await.unwrap();
        assert_eq!(updated.id(), 2);
        assert_eq!(updated.question(), "Capital de Bélgica");

        let reread = store.find_by_id(2).await.unwrap().unwrap();
        assert_eq!(reread.answer(), "Bruselas");
    }

    #[tokio::test]
    async fn destroy_reports_rows_removed() {
        let store = memory_store().await;
        assert_eq!(store.destroy(3).await.unwrap(), 1);
        assert!(store.find_by_id(3).await.unwrap().is_none());

        // Deleting an id that does not exist is a no-op, not an error.
        assert_eq!(store.destroy(99).await.unwrap(), 0);
    }
}
