use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::queries::quizes;
use crate::db::{Question, Quiz};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
struct NewQuiz {
    category: i64,
    name: String,
    #[serde(rename = "questionCount")]
    question_count: i64,
    reward: i64,
}

#[derive(Deserialize)]
struct NewQuestion {
    #[serde(rename = "quizId")]
    quiz_id: i64,
    question: String,
}

#[derive(Deserialize)]
struct NewAnswer {
    #[serde(rename = "questionId")]
    question_id: i64,
    answer: String,
    correct: bool,
}

#[derive(Serialize)]
struct Description {
    description: &'static str,
}

#[derive(Serialize)]
struct Listing<T> {
    description: &'static str,
    data: Vec<T>,
}

async fn add_quiz(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewQuiz>,
) -> Result<Json<Description>, ApiError> {
    quizes::add_quiz(
        &pool,
        body.category,
        &body.name,
        body.question_count,
        body.reward,
    )
    .await
    .map_err(|e| ApiError::storage("Add quiz error", e))?;
    Ok(Json(Description {
        description: "Add quiz successful",
    }))
}

async fn add_question(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewQuestion>,
) -> Result<Json<Description>, ApiError> {
    quizes::add_question(&pool, body.quiz_id, &body.question)
        .await
        .map_err(|e| ApiError::storage("Add question error", e))?;
    Ok(Json(Description {
        description: "Add question successful",
    }))
}

async fn add_answer(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewAnswer>,
) -> Result<Json<Description>, ApiError> {
    quizes::add_answer(&pool, body.question_id, &body.answer, body.correct)
        .await
        .map_err(|e| ApiError::storage("Add answer error", e))?;
    Ok(Json(Description {
        description: "Add answer successful",
    }))
}

// For the three listing endpoints an empty result set is an error; only
// skills/achievements reads treat empty as legitimate data.
fn non_empty<T>(rows: Vec<T>, description: &'static str) -> Result<Vec<T>, ApiError> {
    if rows.is_empty() {
        Err(ApiError::bad_request(description))
    } else {
        Ok(rows)
    }
}

async fn get_categories(
    State(pool): State<SqlitePool>,
) -> Result<Json<Listing<i64>>, ApiError> {
    let rows = quizes::list_categories(&pool)
        .await
        .map_err(|e| ApiError::storage("Get categories error", e))?;
    Ok(Json(Listing {
        description: "Get categories successful",
        data: non_empty(rows, "Get categories error")?,
    }))
}

async fn get_quizes(State(pool): State<SqlitePool>) -> Result<Json<Listing<Quiz>>, ApiError> {
    let rows = quizes::list_quizes(&pool)
        .await
        .map_err(|e| ApiError::storage("Get quizes error", e))?;
    Ok(Json(Listing {
        description: "Get quizes successful",
        data: non_empty(rows, "Get quizes error")?,
    }))
}

async fn get_questions(
    State(pool): State<SqlitePool>,
) -> Result<Json<Listing<Question>>, ApiError> {
    let rows = quizes::list_questions(&pool)
        .await
        .map_err(|e| ApiError::storage("Get questions error", e))?;
    Ok(Json(Listing {
        description: "Get questions successful",
        data: non_empty(rows, "Get questions error")?,
    }))
}

pub fn quiz_router(state: AppState) -> Router {
    Router::new()
        .route("/addQuiz", post(add_quiz))
        .route("/addQuestion", post(add_question))
        .route("/addAnswer", post(add_answer))
        .route("/getCategories", get(get_categories))
        .route("/getQuizes", get(get_quizes))
        .route("/getQuestions", get(get_questions))
        .with_state(state)
}
