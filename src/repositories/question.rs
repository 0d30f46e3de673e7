//! QuestionRepository - Richieste dal modulo contatti

use super::{Create, Delete, Read, inserted_id};
use crate::dtos::CreateQuestionDTO;
use crate::entities::Question;
use sqlx::{Error, MySqlPool};
use tracing::{info, instrument};

const QUESTION_COLUMNS: &str = "question_id, name, email, phone, message, is_answered, created_at";

pub struct QuestionRepository {
    connection_pool: MySqlPool,
}

impl QuestionRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Unanswered first, newest first
    pub async fn list(&self) -> Result<Vec<Question>, Error> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions ORDER BY is_answered, created_at DESC, question_id DESC",
            QUESTION_COLUMNS
        ))
        .fetch_all(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn set_answered(&self, question_id: i32, is_answered: bool) -> Result<Question, Error> {
        sqlx::query("UPDATE questions SET is_answered = ? WHERE question_id = ?")
            .bind(is_answered)
            .bind(question_id)
            .execute(&self.connection_pool)
            .await?;

        self.read(&question_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Create<Question, CreateQuestionDTO> for QuestionRepository {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create(&self, data: &CreateQuestionDTO) -> Result<Question, Error> {
        let result =
            sqlx::query("INSERT INTO questions (name, email, phone, message) VALUES (?, ?, ?, ?)")
                .bind(&data.name)
                .bind(&data.email)
                .bind(data.phone.as_deref())
                .bind(&data.message)
                .execute(&self.connection_pool)
                .await?;

        let new_id = inserted_id(result.last_insert_id())?;
        info!("Question {} received", new_id);
        self.read(&new_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Question, i32> for QuestionRepository {
    async fn read(&self, id: &i32) -> Result<Option<Question>, Error> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE question_id = ?",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i32> for QuestionRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        sqlx::query("DELETE FROM questions WHERE question_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }
}
