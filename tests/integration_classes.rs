mod common;

use axum::http::StatusCode;
use classlog::classlog_core::UserRole;
use common::{
    count_rows, create_test_class, create_test_contact, create_test_student, create_test_user,
    fail_deletes_on, generate_unique_email, send, setup_test_app, token_for,
};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_class_defaults_to_active(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let token = token_for(&teacher);

    let (status, body) = send(
        &app,
        "POST",
        "/api/classes",
        Some(&token),
        Some(json!({ "name": "Mathematics 101" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Mathematics 101");
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["created_by_id"], teacher.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_class_validation(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let token = token_for(&teacher);

    let (status, body) = send(&app, "POST", "/api/classes", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");

    let (status, _) = send(
        &app,
        "POST",
        "/api/classes",
        Some(&token),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/classes",
        Some(&token),
        Some(json!({ "name": "Art", "status": "ARCHIVED" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(count_rows(&pool, "classes").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_classes_require_authentication(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let (status, _) = send(&app, "GET", "/api/classes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/classes",
        None,
        Some(json!({ "name": "Art" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_classes_visibility(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher_a =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let teacher_b =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let coordinator = create_test_user(
        &mut tx,
        &generate_unique_email(),
        "password123",
        UserRole::Coordinator,
    )
    .await;

    let own = create_test_class(&mut tx, "Own Class", teacher_a.id).await;
    let other = create_test_class(&mut tx, "Other Class", teacher_b.id).await;
    let shared = create_test_class(&mut tx, "Shared Class", coordinator.id).await;
    create_test_student(&mut tx, "Ana Souza", own).await;
    create_test_student(&mut tx, "Bruno Lima", own).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());

    let (status, body) = send(&app, "GET", "/api/classes", Some(&token_for(&teacher_a)), None).await;
    assert_eq!(status, StatusCode::OK);
    let visible = ids(&body);
    assert!(visible.contains(&own.to_string()));
    assert!(visible.contains(&shared.to_string()));
    assert!(!visible.contains(&other.to_string()));

    let own_entry = body
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == own.to_string())
        .unwrap();
    assert_eq!(own_entry["student_count"], 2);

    let (status, body) =
        send(&app, "GET", "/api/classes", Some(&token_for(&coordinator)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body).len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_class_detail_includes_students_and_contacts(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let class_id = create_test_class(&mut tx, "History", teacher.id).await;
    let student_id = create_test_student(&mut tx, "Ana Souza", class_id).await;
    create_test_contact(&mut tx, student_id, "Called the mother", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], class_id.to_string());
    let students = body["students"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["id"], student_id.to_string());
    assert_eq!(students[0]["contacts"].as_array().unwrap().len(), 1);
    assert_eq!(students[0]["contacts"][0]["type"], "PHONE");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_class_not_found(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Admin).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/classes/{}", Uuid::new_v4()),
        Some(&token_for(&admin)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Class not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_reads_but_cannot_modify_coordinator_class(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let coordinator = create_test_user(
        &mut tx,
        &generate_unique_email(),
        "password123",
        UserRole::Coordinator,
    )
    .await;
    let class_id = create_test_class(&mut tx, "Biology", coordinator.id).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let token = token_for(&teacher);
    let uri = format!("/api/classes/{}", class_id);

    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized to update this class");

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(count_rows(&pool, "classes").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_see_other_teacher_class(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher_a =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let teacher_b =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let class_id = create_test_class(&mut tx, "Chemistry", teacher_b.id).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&teacher_a)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized to view this class");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_own_class(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let class_id = create_test_class(&mut tx, "Physics", teacher.id).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&teacher)),
        Some(json!({ "status": "INACTIVE" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Physics");
    assert_eq!(body["status"], "INACTIVE");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_validates_before_lookup(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/classes/{}", Uuid::new_v4()),
        Some(&token_for(&teacher)),
        Some(json!({ "colour": "blue" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_class_cascades(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let class_id = create_test_class(&mut tx, "Geography", teacher.id).await;
    let kept_class = create_test_class(&mut tx, "Arts", teacher.id).await;
    let s1 = create_test_student(&mut tx, "Ana Souza", class_id).await;
    let s2 = create_test_student(&mut tx, "Bruno Lima", class_id).await;
    let kept_student = create_test_student(&mut tx, "Carla Dias", kept_class).await;
    create_test_contact(&mut tx, s1, "first", None).await;
    create_test_contact(&mut tx, s1, "second", None).await;
    create_test_contact(&mut tx, s2, "third", None).await;
    create_test_contact(&mut tx, kept_student, "kept", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classes_deleted"], 1);
    assert_eq!(body["students_deleted"], 2);
    assert_eq!(body["contacts_deleted"], 3);

    assert_eq!(count_rows(&pool, "classes").await, 1);
    assert_eq!(count_rows(&pool, "students").await, 1);
    assert_eq!(count_rows(&pool, "contacts").await, 1);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&teacher)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_coordinator_deletes_teacher_class(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let coordinator = create_test_user(
        &mut tx,
        &generate_unique_email(),
        "password123",
        UserRole::Coordinator,
    )
    .await;
    let class_id = create_test_class(&mut tx, "English", teacher.id).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&coordinator)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["students_deleted"], 0);
    assert_eq!(body["contacts_deleted"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_class_rolls_back_on_failure(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let class_id = create_test_class(&mut tx, "Portuguese", teacher.id).await;
    let student_id = create_test_student(&mut tx, "Ana Souza", class_id).await;
    create_test_contact(&mut tx, student_id, "note", None).await;
    tx.commit().await.unwrap();

    // Fail the last statement of the cascade
    sqlx::query(
        "CREATE FUNCTION refuse_class_delete() RETURNS trigger AS $$
         BEGIN RAISE EXCEPTION 'class delete refused'; END;
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER refuse_class_delete BEFORE DELETE ON classes
         FOR EACH ROW EXECUTE FUNCTION refuse_class_delete()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    assert_eq!(count_rows(&pool, "classes").await, 1);
    assert_eq!(count_rows(&pool, "students").await, 1);
    assert_eq!(count_rows(&pool, "contacts").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_class_rolls_back_when_contacts_fail(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    let class_id = create_test_class(&mut tx, "Geography", teacher.id).await;
    let first = create_test_student(&mut tx, "Ana Souza", class_id).await;
    let second = create_test_student(&mut tx, "Bruno Lima", class_id).await;
    create_test_contact(&mut tx, first, "deletable", None).await;
    create_test_contact(&mut tx, second, "locked", None).await;
    tx.commit().await.unwrap();

    fail_deletes_on(&pool, "contacts", "OLD.description = 'locked'").await;

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{}", class_id),
        Some(&token_for(&teacher)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    assert_eq!(count_rows(&pool, "classes").await, 1);
    assert_eq!(count_rows(&pool, "students").await, 2);
    assert_eq!(count_rows(&pool, "contacts").await, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_malformed_class_id_is_json_bad_request(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher =
        create_test_user(&mut tx, &generate_unique_email(), "password123", UserRole::Teacher).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let token = token_for(&teacher);

    for method in ["GET", "DELETE"] {
        let (status, body) =
            send(&app, method, "/api/classes/not-a-uuid", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid id in path");
    }
}
