//! Question services - Modulo contatti pubblico

use crate::core::{AppError, AppState};
use crate::dtos::{CreateQuestionDTO, QuestionDTO};
use crate::repositories::Create;
use axum::{
    extract::State,
    http::StatusCode,
};
use crate::core::extract::Json;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn submit_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateQuestionDTO>,
) -> Result<(StatusCode, Json<QuestionDTO>), AppError> {
    body.validate()?;
    let question = state.question.create(&body).await?;
    info!("Question {} stored", question.question_id);
    Ok((StatusCode::CREATED, Json(QuestionDTO::from(question))))
}
