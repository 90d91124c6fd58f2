use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::queries::users;
use crate::password;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::telemetry::REGISTRATION_CNTR;

const MAX_USERNAME_LEN: usize = 30;

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct Registered {
    description: &'static str,
}

#[derive(Serialize)]
struct LoggedIn {
    description: &'static str,
    id: String,
    username: String,
}

async fn register(
    State(pool): State<SqlitePool>,
    Json(body): Json<Credentials>,
) -> Result<Json<Registered>, ApiError> {
    let existing = users::find_user_by_username(&pool, &body.username)
        .await
        .map_err(|e| ApiError::storage("User already exists", e))?;
    if existing.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    if body.username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request("Username over 30 characters"));
    }

    let id = Uuid::new_v4().to_string();
    let hash = password::hash_password(&body.password)
        .map_err(|_| ApiError::bad_request("Registration error occurred"))?;

    // The existence check above races with concurrent registrations; the
    // UNIQUE constraint on username is what actually decides the winner.
    if let Err(e) = users::create_user(&pool, &id, &body.username, &hash).await {
        let duplicate = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        return Err(if duplicate {
            ApiError::bad_request("User already exists")
        } else {
            ApiError::storage("Registration error occurred", e)
        });
    }

    REGISTRATION_CNTR.inc();
    tracing::info!("Registered user {}", body.username);
    Ok(Json(Registered {
        description: "Registration successful",
    }))
}

async fn login(
    State(pool): State<SqlitePool>,
    Json(body): Json<Credentials>,
) -> Result<Json<LoggedIn>, ApiError> {
    // Wrong username and wrong password are deliberately indistinguishable.
    let user = users::find_user_by_username(&pool, &body.username)
        .await
        .map_err(|e| ApiError::storage("Wrong login data", e))?
        .ok_or_else(|| ApiError::bad_request("Wrong login data"))?;

    if !password::verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::bad_request("Wrong login data"));
    }

    Ok(Json(LoggedIn {
        description: "Successful login",
        id: user.id,
        username: user.username,
    }))
}

pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}
