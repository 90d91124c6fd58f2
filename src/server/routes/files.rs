use askama::Template;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::db::queries::files;
use crate::db::FileMeta;
use crate::server::app::{AppState, UploadDir};
use crate::server::error::ApiError;
use crate::telemetry::UPLOAD_CNTR;

#[derive(TryFromMultipart)]
struct UploadForm {
    #[form_data(limit = "1GiB")]
    filetoupload: FieldData<NamedTempFile>,
}

#[derive(Deserialize)]
struct DownloadQuery {
    id: Option<String>,
}

// The raw gateway wrapper, returned verbatim by /allPdfs instead of the
// standard description envelope. Preserved for compatibility, see DESIGN.md.
#[derive(Serialize)]
struct RawResult {
    success: bool,
    data: Vec<FileMeta>,
}

#[derive(Template)]
#[template(path = "file_upload.html", escape = "none")]
struct UploadPage;

async fn upload_form() -> Html<String> {
    let tmpl = UploadPage {};
    Html(tmpl.render().unwrap())
}

/// Everything before the final dot becomes the stored name, everything after
/// it the extension. A name without a dot stores the whole name as the
/// extension and an empty base name, matching the original split. Path
/// separators are stripped from the extension since it ends up in the on-disk
/// name.
fn split_file_name(name: &str) -> (String, String) {
    let (base, extension) = match name.rsplit_once('.') {
        Some((base, extension)) => (base.to_owned(), extension.to_owned()),
        None => (String::new(), name.to_owned()),
    };
    let extension = extension
        .chars()
        .filter(|c| !matches!(c, '/' | '\\'))
        .collect();
    (base, extension)
}

async fn upload_file(
    State(pool): State<SqlitePool>,
    State(upload_dir): State<UploadDir>,
    TypedMultipart(form): TypedMultipart<UploadForm>,
) -> Result<StatusCode, ApiError> {
    let id = Uuid::new_v4().to_string();
    let file_name = form.filetoupload.metadata.file_name.unwrap_or_default();
    let (original_name, extension) = split_file_name(&file_name);

    // Bytes land on disk first; the metadata row is only written once the
    // stream is complete.
    let path = upload_dir.0.join(format!("{id}.{extension}"));
    form.filetoupload
        .contents
        .persist(&path)
        .map_err(|e| ApiError::Upload(e.error.into()))?;

    files::add_file_meta(&pool, &id, &extension, &original_name)
        .await
        .map_err(|e| ApiError::Upload(e.into()))?;

    UPLOAD_CNTR.with_label_values(&[extension.as_str()]).inc();
    tracing::info!("Uploaded {file_name} as {id}.{extension}");
    Ok(StatusCode::OK)
}

async fn download_file(
    State(pool): State<SqlitePool>,
    State(upload_dir): State<UploadDir>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::bad_request("Id must be a string"))?;
    let meta = files::get_file_meta(&pool, &id)
        .await
        .map_err(|e| ApiError::storage("No such file", e))?
        .ok_or_else(|| ApiError::bad_request("No such file"))?;

    let path = upload_dir.0.join(meta.disk_name());
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::bad_request("No such file"))?;

    let mime = mime_guess::from_ext(&meta.extension).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref()).unwrap(),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", meta.download_name())
            .parse()
            .unwrap(),
    );
    tracing::info!("Returning file {} as {}", meta.disk_name(), meta.download_name());
    Ok((headers, bytes).into_response())
}

async fn all_pdfs(State(pool): State<SqlitePool>) -> Json<RawResult> {
    match files::list_all_file_meta(&pool).await {
        Ok(data) => Json(RawResult {
            success: true,
            data,
        }),
        Err(e) => {
            tracing::error!(error = %e, "listing uploaded files failed");
            Json(RawResult {
                success: false,
                data: vec![],
            })
        }
    }
}

pub fn files_router(state: AppState) -> Router {
    Router::new()
        .route("/fileUpload", get(upload_form))
        .route("/file", get(download_file).post(upload_file))
        .route("/allPdfs", get(all_pdfs))
        .with_state(state)
}
