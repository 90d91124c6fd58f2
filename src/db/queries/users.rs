use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub title: Option<String>,
    pub bio: Option<String>,
}

/// User row without the credential column, as returned to clients.
#[derive(Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub title: Option<String>,
    pub bio: Option<String>,
}

#[derive(Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub level: i64,
}

#[derive(Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password_hash, title, bio FROM users WHERE username = ?1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    password_hash: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(())
}

// Title is keyed by username, bio by id. The asymmetry is part of the public
// contract, see DESIGN.md.
pub async fn set_title(pool: &SqlitePool, username: &str, title: &str) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE users SET title = ?1 WHERE username = ?2
        "#,
    )
    .bind(title)
    .bind(username)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn get_title(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Option<String>>> {
    sqlx::query_scalar::<_, Option<String>>(
        r#"
        SELECT title FROM users WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn set_bio(pool: &SqlitePool, id: &str, bio: &str) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE users SET bio = ?1 WHERE id = ?2
        "#,
    )
    .bind(bio)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn get_bio(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Option<String>>> {
    sqlx::query_scalar::<_, Option<String>>(
        r#"
        SELECT bio FROM users WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_single_data(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, username, title, bio FROM users WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_skills(pool: &SqlitePool, id: &str) -> sqlx::Result<Vec<Skill>> {
    sqlx::query_as::<_, Skill>(
        r#"
        SELECT id, user_id, name, level FROM skills WHERE user_id = ?1 ORDER BY id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
}

pub async fn get_achievements(pool: &SqlitePool, id: &str) -> sqlx::Result<Vec<Achievement>> {
    sqlx::query_as::<_, Achievement>(
        r#"
        SELECT id, user_id, name, description FROM achievements WHERE user_id = ?1 ORDER BY id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
}
