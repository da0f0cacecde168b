use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use classlog::classlog_auth::create_access_token;
use classlog::classlog_config::{CorsConfig, JwtConfig};
use classlog::classlog_core::{UserRole, hash_password};
use classlog::router::init_router;
use classlog::state::AppState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

/// Create a test user with the given role
pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: UserRole,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Test User")
    .bind(email)
    .bind(hashed)
    .bind(role.as_str())
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
        role,
    }
}

/// Signs a token for `user` without going through the login endpoint.
#[allow(dead_code)]
pub fn token_for(user: &TestUser) -> String {
    dotenvy::dotenv().ok();
    create_access_token(user.id, &user.email, user.role, &JwtConfig::from_env()).unwrap()
}

/// Logs in through the API and returns the access token.
#[allow(dead_code)]
pub async fn get_auth_token(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

/// Sends one request through the router and returns the status and JSON body
/// (`Value::Null` when the body is empty).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

#[allow(dead_code)]
pub async fn create_test_class(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    created_by_id: Uuid,
) -> Uuid {
    sqlx::query_scalar("INSERT INTO classes (name, created_by_id) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(created_by_id)
        .fetch_one(&mut **tx)
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_student(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    class_id: Uuid,
) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO students (name, cpf, phone, class_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(generate_unique_cpf())
    .bind("(11) 98765-4321")
    .bind(class_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

/// Inserts a contact, optionally back-dated to `created_at`.
#[allow(dead_code)]
pub async fn create_test_contact(
    tx: &mut Transaction<'_, Postgres>,
    student_id: Uuid,
    description: &str,
    created_at: Option<DateTime<Utc>>,
) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO contacts (contact_type, contact_name, description, student_id, created_at)
         VALUES ('PHONE', 'Maria Silva', $1, $2, COALESCE($3, NOW()))
         RETURNING id",
    )
    .bind(description)
    .bind(student_id)
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Makes every row-level delete on `table` matching `condition` (over `OLD`)
/// raise, so a cascade fails partway through.
#[allow(dead_code)]
pub async fn fail_deletes_on(pool: &PgPool, table: &str, condition: &str) {
    sqlx::query(&format!(
        "CREATE FUNCTION refuse_{table}_delete() RETURNS trigger AS $$
         BEGIN
             IF {condition} THEN RAISE EXCEPTION '{table} delete refused'; END IF;
             RETURN OLD;
         END;
         $$ LANGUAGE plpgsql"
    ))
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(&format!(
        "CREATE TRIGGER refuse_{table}_delete BEFORE DELETE ON {table}
         FOR EACH ROW EXECUTE FUNCTION refuse_{table}_delete()"
    ))
    .execute(pool)
    .await
    .unwrap();
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Eleven random digits.
#[allow(dead_code)]
pub fn generate_unique_cpf() -> String {
    format!("{:011}", Uuid::new_v4().as_u128() % 100_000_000_000)
}
