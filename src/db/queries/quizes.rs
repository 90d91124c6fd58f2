use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i64,
    pub category: i64,
    pub name: String,
    pub question_count: i64,
    pub reward: i64,
}

#[derive(Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question: String,
}

#[derive(Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub answer: String,
    pub correct: bool,
}

pub async fn add_quiz(
    pool: &SqlitePool,
    category: i64,
    name: &str,
    question_count: i64,
    reward: i64,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO quizes (category, name, question_count, reward) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(category)
    .bind(name)
    .bind(question_count)
    .bind(reward)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn add_question(pool: &SqlitePool, quiz_id: i64, question: &str) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (quiz_id, question) VALUES (?1, ?2)
        "#,
    )
    .bind(quiz_id)
    .bind(question)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn add_answer(
    pool: &SqlitePool,
    question_id: i64,
    answer: &str,
    correct: bool,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO answers (question_id, answer, correct) VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(question_id)
    .bind(answer)
    .bind(correct)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

// There is no categories table, a category exists once some quiz uses it.
pub async fn list_categories(pool: &SqlitePool) -> sqlx::Result<Vec<i64>> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT DISTINCT category FROM quizes ORDER BY category
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn list_quizes(pool: &SqlitePool) -> sqlx::Result<Vec<Quiz>> {
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, category, name, question_count, reward FROM quizes ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn list_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, question FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}
