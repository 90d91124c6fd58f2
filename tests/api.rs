use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use quizhub::db::queries::users::find_user_by_username;
use quizhub::server::app::{app, AppState, UploadDir};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app(pool: SqlitePool, dir: &TempDir) -> Router {
    let upload_dir = dir.path().join("uploads");
    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&upload_dir).unwrap();
    std::fs::create_dir_all(&static_dir).unwrap();
    app(AppState {
        pool,
        upload_dir: UploadDir(upload_dir),
        static_dir,
    })
}

async fn send_json(app: &Router, method: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

const BOUNDARY: &str = "test-boundary-4e1c";

fn multipart_body(filename: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"filetoupload\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &Router, filename: &str, payload: &[u8]) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/file")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(filename, payload)))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send_json(
        app,
        "POST",
        "/register",
        json!({ "username": username, "password": password }),
    )
    .await
}

#[sqlx::test]
async fn register_twice_reports_existing_user(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool, &dir);

    let (status, body) = register(&app, "alice", "hunter2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Registration successful");

    // Same username, different password: still a duplicate.
    let (status, body) = register(&app, "alice", "other-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "User already exists");
}

#[sqlx::test]
async fn overlong_username_is_rejected(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool, &dir);

    let (status, body) = register(&app, &"a".repeat(31), "hunter2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "Username over 30 characters");

    let (status, _) = register(&app, &"a".repeat(30), "hunter2").await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test]
async fn login_returns_registered_id_and_hides_which_part_was_wrong(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool.clone(), &dir);

    register(&app, "alice", "hunter2").await;
    let stored = find_user_by_username(&pool, "alice")
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        "/login",
        json!({ "username": "alice", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Successful login");
    assert_eq!(body["id"], stored.id.as_str());
    assert_eq!(body["username"], "alice");

    let (status, wrong_password) = send_json(
        &app,
        "POST",
        "/login",
        json!({ "username": "alice", "password": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, wrong_username) = send_json(
        &app,
        "POST",
        "/login",
        json!({ "username": "bob", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password, wrong_username);
}

#[sqlx::test]
async fn title_and_bio_flow(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool.clone(), &dir);

    register(&app, "alice", "hunter2").await;
    let id = find_user_by_username(&pool, "alice")
        .await
        .unwrap()
        .unwrap()
        .id;

    let (status, _) = send_json(
        &app,
        "POST",
        "/title",
        json!({ "username": "alice", "title": "Captain" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Title set is keyed by username and does not report a missing user.
    let (status, _) = send_json(
        &app,
        "POST",
        "/title",
        json!({ "username": "nobody", "title": "Captain" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "POST", "/getTitle", json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Captain");

    let (status, body) =
        send_json(&app, "POST", "/getTitle", json!({ "id": "missing-id" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "Get title error");

    // Bio set is keyed by id and does report a missing user.
    let (status, _) = send_json(&app, "POST", "/bio", json!({ "id": id, "bio": "Hello" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(
        &app,
        "POST",
        "/bio",
        json!({ "id": "missing-id", "bio": "Hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The bio value comes back under the `title` key.
    let (status, body) = send_json(&app, "POST", "/getBio", json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Get bio successful");
    assert_eq!(body["title"], "Hello");

    let (status, _) = send_json(&app, "POST", "/getBio", json!({ "id": "missing-id" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn user_data_allows_empty_skills_and_achievements(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool.clone(), &dir);

    register(&app, "alice", "hunter2").await;
    let id = find_user_by_username(&pool, "alice")
        .await
        .unwrap()
        .unwrap()
        .id;

    let (status, body) = send_json(&app, "POST", "/getUserData", json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["single"]["username"], "alice");
    assert_eq!(body["data"]["skills"], json!([]));
    assert_eq!(body["data"]["achievements"], json!([]));

    sqlx::query("INSERT INTO skills (user_id, name, level) VALUES (?1, ?2, ?3)")
        .bind(&id)
        .bind("archery")
        .bind(3_i64)
        .execute(&pool)
        .await
        .unwrap();

    // GET variant resolves the user by username carried in the body.
    let (status, body) = send_json(
        &app,
        "GET",
        "/getUserData",
        json!({ "username": "alice" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["skills"][0]["name"], "archery");

    let (status, _) =
        send_json(&app, "POST", "/getUserData", json!({ "id": "missing-id" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn quiz_content_flow(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool, &dir);

    // Empty listings are errors, not empty successes.
    for path in ["/getCategories", "/getQuizes", "/getQuestions"] {
        let (status, _) = get(&app, path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
    }

    let (status, _) = send_json(
        &app,
        "POST",
        "/addQuiz",
        json!({ "category": 2, "name": "Capitals", "questionCount": 10, "reward": 50 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "POST",
        "/addQuestion",
        json!({ "quizId": 1, "question": "Capital of France?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "POST",
        "/addAnswer",
        json!({ "questionId": 1, "answer": "Paris", "correct": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/getCategories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([2]));

    let (status, body) = get(&app, "/getQuizes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Capitals");
    assert_eq!(body["data"][0]["reward"], 50);

    let (status, body) = get(&app, "/getQuestions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["question"], "Capital of France?");
}

#[sqlx::test]
async fn upload_then_download_rebuilds_the_original_name(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool, &dir);

    let payload = b"%PDF-1.4 not really a pdf";
    let response = upload(&app, "report.final.pdf", payload).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());

    // /allPdfs exposes the raw gateway wrapper with the generated id.
    let (status, listing) = get(&app, "/allPdfs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["success"], true);
    assert_eq!(listing["data"][0]["extension"], "pdf");
    assert_eq!(listing["data"][0]["original_name"], "report.final");
    let id = listing["data"][0]["id"].as_str().unwrap().to_owned();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/file?id={id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.final.pdf\""
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], payload);
}

#[sqlx::test]
async fn failed_metadata_write_is_a_bare_server_error(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool.clone(), &dir);

    // With the files table gone the bytes still land on disk, but the
    // metadata insert fails and must surface as 500 with no body.
    sqlx::query("DROP TABLE files")
        .execute(&pool)
        .await
        .unwrap();

    let response = upload(&app, "report.final.pdf", b"%PDF-1.4").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[sqlx::test]
async fn download_errors(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool, &dir);

    let (status, body) = get(&app, "/file?id=no-such-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "No such file");

    let (status, body) = get(&app, "/file").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "Id must be a string");
}

#[sqlx::test]
async fn greeting_form_and_fallback(pool: SqlitePool) {
    let dir = TempDir::new().unwrap();
    let app = test_app(pool, &dir);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello world!");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/fileUpload")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("filetoupload"));
    assert!(page.contains("multipart/form-data"));

    let (status, _) = get(&app, "/definitely-not-a-route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
