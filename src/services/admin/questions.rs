//! Admin questions - Richieste dal modulo contatti

use crate::core::{AppError, AppState};
use crate::dtos::{QuestionDTO, UpdateQuestionDTO};
use crate::repositories::{Delete, Read};
use axum::extract::State;
use crate::core::extract::{Json, Path};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

pub async fn list_questions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<QuestionDTO>>, AppError> {
    let questions = state.question.list().await?;
    Ok(Json(questions.into_iter().map(QuestionDTO::from).collect()))
}

#[instrument(skip(state, body), fields(question_id = %question_id))]
pub async fn update_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i32>,
    Json(body): Json<UpdateQuestionDTO>,
) -> Result<Json<QuestionDTO>, AppError> {
    if state.question.read(&question_id).await?.is_none() {
        return Err(AppError::not_found("Question not found"));
    }
    let question = state
        .question
        .set_answered(question_id, body.is_answered)
        .await?;
    Ok(Json(QuestionDTO::from(question)))
}

#[instrument(skip(state), fields(question_id = %question_id))]
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.question.read(&question_id).await?.is_none() {
        return Err(AppError::not_found("Question not found"));
    }
    state.question.delete(&question_id).await?;
    Ok(Json(json!({ "message": "Question deleted" })))
}
