pub mod queries;

use sqlx::sqlite::SqlitePool;

pub use queries::files::FileMeta;
pub use queries::quizes::{Answer, Question, Quiz};
pub use queries::users::{Achievement, Profile, Skill, User};

use sqlx::Error;

pub async fn establish_connection(path: &str) -> Result<SqlitePool, Error> {
    SqlitePool::connect(format!("sqlite:{}", path).as_str()).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
