use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Serialize, Deserialize, FromRow)]
pub struct FileMeta {
    pub id: String,
    pub extension: String,
    pub original_name: String,
}

impl FileMeta {
    /// Name presented to the client on download.
    pub fn download_name(&self) -> String {
        format!("{}.{}", self.original_name, self.extension)
    }

    /// On-disk name: the generated id plus the stored extension. The base is
    /// never client input; the extension is, stripped of path separators
    /// before storage.
    pub fn disk_name(&self) -> String {
        format!("{}.{}", self.id, self.extension)
    }
}

pub async fn add_file_meta(
    pool: &SqlitePool,
    id: &str,
    extension: &str,
    original_name: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO files (id, extension, original_name) VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(id)
    .bind(extension)
    .bind(original_name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_file_meta(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<FileMeta>> {
    sqlx::query_as::<_, FileMeta>(
        r#"
        SELECT id, extension, original_name FROM files WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_all_file_meta(pool: &SqlitePool) -> sqlx::Result<Vec<FileMeta>> {
    sqlx::query_as::<_, FileMeta>(
        r#"
        SELECT id, extension, original_name FROM files ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}
