use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::queries::users;
use crate::db::{Achievement, Profile, Skill};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
struct SetTitle {
    username: String,
    title: String,
}

#[derive(Deserialize)]
struct SetBio {
    id: String,
    bio: String,
}

#[derive(Deserialize)]
struct UserId {
    id: String,
}

#[derive(Deserialize)]
struct Username {
    username: String,
}

#[derive(Serialize)]
struct Description {
    description: &'static str,
}

#[derive(Serialize)]
struct TitleValue {
    description: &'static str,
    // Also carries the bio value on /getBio; the field name is part of the
    // original contract, see DESIGN.md.
    title: Option<String>,
}

#[derive(Serialize)]
struct UserData {
    single: Profile,
    skills: Vec<Skill>,
    achievements: Vec<Achievement>,
}

#[derive(Serialize)]
struct UserDataResponse {
    description: &'static str,
    data: UserData,
}

async fn set_title(
    State(pool): State<SqlitePool>,
    Json(body): Json<SetTitle>,
) -> Result<Json<Description>, ApiError> {
    // Unlike /bio, this reports success even when no row matched.
    users::set_title(&pool, &body.username, &body.title)
        .await
        .map_err(|e| ApiError::storage("Set title error", e))?;
    Ok(Json(Description {
        description: "Set title successful",
    }))
}

async fn get_title(
    State(pool): State<SqlitePool>,
    Json(body): Json<UserId>,
) -> Result<Json<TitleValue>, ApiError> {
    let title = users::get_title(&pool, &body.id)
        .await
        .map_err(|e| ApiError::storage("Get title error", e))?
        .ok_or_else(|| ApiError::bad_request("Get title error"))?;
    Ok(Json(TitleValue {
        description: "Get title successful",
        title,
    }))
}

async fn set_bio(
    State(pool): State<SqlitePool>,
    Json(body): Json<SetBio>,
) -> Result<Json<Description>, ApiError> {
    let updated = users::set_bio(&pool, &body.id, &body.bio)
        .await
        .map_err(|e| ApiError::storage("Set bio error", e))?;
    if updated != 1 {
        return Err(ApiError::bad_request("Set bio error"));
    }
    Ok(Json(Description {
        description: "Set bio successful",
    }))
}

async fn get_bio(
    State(pool): State<SqlitePool>,
    Json(body): Json<UserId>,
) -> Result<Json<TitleValue>, ApiError> {
    let bio = users::get_bio(&pool, &body.id)
        .await
        .map_err(|e| ApiError::storage("Get bio error", e))?
        .ok_or_else(|| ApiError::bad_request("Get bio error"))?;
    Ok(Json(TitleValue {
        description: "Get bio successful",
        title: bio,
    }))
}

async fn user_data(pool: &SqlitePool, id: &str) -> Result<UserData, ApiError> {
    let single = users::get_single_data(pool, id)
        .await
        .map_err(|e| ApiError::storage("Get user data error", e))?
        .ok_or_else(|| ApiError::bad_request("Get user data error"))?;
    // Zero skills or achievements is a legitimate empty result, not an error.
    let skills = users::get_skills(pool, id)
        .await
        .map_err(|e| ApiError::storage("Get user data error", e))?;
    let achievements = users::get_achievements(pool, id)
        .await
        .map_err(|e| ApiError::storage("Get user data error", e))?;
    Ok(UserData {
        single,
        skills,
        achievements,
    })
}

async fn get_user_data(
    State(pool): State<SqlitePool>,
    Json(body): Json<UserId>,
) -> Result<Json<UserDataResponse>, ApiError> {
    let data = user_data(&pool, &body.id).await?;
    Ok(Json(UserDataResponse {
        description: "Get user data successful",
        data,
    }))
}

// The GET variant resolves the user by username carried in a JSON body, a
// quirk of the original surface that clients depend on.
async fn get_user_data_by_username(
    State(pool): State<SqlitePool>,
    Json(body): Json<Username>,
) -> Result<Json<UserDataResponse>, ApiError> {
    let user = users::find_user_by_username(&pool, &body.username)
        .await
        .map_err(|e| ApiError::storage("Get user data error", e))?
        .ok_or_else(|| ApiError::bad_request("Get user data error"))?;
    let data = user_data(&pool, &user.id).await?;
    Ok(Json(UserDataResponse {
        description: "Get user data successful",
        data,
    }))
}

pub fn profile_router(state: AppState) -> Router {
    Router::new()
        .route("/title", post(set_title))
        .route("/getTitle", post(get_title))
        .route("/bio", post(set_bio))
        .route("/getBio", post(get_bio))
        .route(
            "/getUserData",
            post(get_user_data).get(get_user_data_by_username),
        )
        .with_state(state)
}
